//! Serde bridge, encoding side.
//!
//! [`ValueSerializer`] turns any `T: Serialize` into a [`Value`] tree while
//! honoring the same [`Context`] as the container engine: struct field names
//! go through the key encoding strategy, non-finite floats follow the float
//! strategy, and every nested value knows its [`CodingPath`].
//!
//! Most users reach it through [`Serde`](crate::Serde) or
//! [`Encoder::encode_serde`](crate::Encoder::encode_serde):
//!
//! ```rust
//! use serde::Serialize;
//! use serde_codable::{to_value_with_context, value, Context, KeyStrategy, Serde};
//!
//! #[derive(Serialize)]
//! struct Vegetable {
//!     name: String,
//!     water_content: f64,
//! }
//!
//! let context = Context::new().with_key_encoding(KeyStrategy::SnakeToCamel);
//! let carrot = Serde(Vegetable { name: "Carrot".into(), water_content: 88.0 });
//! assert_eq!(
//!     to_value_with_context(&carrot, &context).unwrap(),
//!     value!({ "name": "Carrot", "waterContent": 88.0 })
//! );
//! ```

use crate::{CodingPath, Context, Encoder, Error, Key, Map, Number, Result, Value};
use chrono::{DateTime, Utc};
use serde::{ser, Serialize};

/// Serializes values into a [`Value`] tree.
pub struct ValueSerializer<'a> {
    path: CodingPath,
    context: &'a Context,
}

impl<'a> ValueSerializer<'a> {
    /// A serializer for the root of a tree.
    pub fn new(context: &'a Context) -> Self {
        ValueSerializer {
            path: CodingPath::root(),
            context,
        }
    }

    fn at(path: CodingPath, context: &'a Context) -> Self {
        ValueSerializer { path, context }
    }

    fn float(&self, v: f64) -> Result<Value> {
        if v.is_finite() {
            return Ok(Value::Number(Number::Float(v)));
        }
        match self.context.non_finite_floats.sentinel_for(v) {
            Some(sentinel) => Ok(Value::String(sentinel.to_string())),
            None => Err(Error::invalid_value(
                v.to_string(),
                &self.path,
                format!(
                    "Unable to encode {} directly. Use NonFiniteFloatStrategy::ConvertToString \
                     to specify how the value should be encoded.",
                    v
                ),
            )),
        }
    }
}

impl ValueSerializer<'_> {
    /// Writes a date marked with [`crate::date`] as the date strategy
    /// prescribes.
    fn date<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let ValueSerializer { path, context } = self;
        let date = match value.serialize(ValueSerializer::at(path.clone(), context))? {
            Value::String(text) => DateTime::parse_from_rfc3339(&text)
                .map(|date| date.with_timezone(&Utc))
                .map_err(|err| {
                    Error::invalid_value(text.clone(), &path, format!("`{}` is not an RFC 3339 date: {}", text, err))
                })?,
            other => {
                return Err(Error::invalid_value(
                    other.kind(),
                    &path,
                    format!("Expected a date but found {}.", other.kind()),
                ))
            }
        };
        let mut slot = Value::Null;
        Encoder::new(&mut slot, path, context)
            .single_value_container()?
            .encode_date(&date)?;
        Ok(slot)
    }
}

/// Serializes `value` as the node at `path`, attaching `path` to errors that
/// were raised without one.
pub(crate) fn to_value<T>(value: &T, path: CodingPath, context: &Context) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    value
        .serialize(ValueSerializer::at(path.clone(), context))
        .map_err(|err| err.located(&path))
}

pub struct SerializeVec<'a> {
    items: Vec<Value>,
    path: CodingPath,
    context: &'a Context,
    variant: Option<&'static str>,
}

pub struct SerializeMap<'a> {
    map: Map,
    next_key: Option<String>,
    path: CodingPath,
    context: &'a Context,
    variant: Option<&'static str>,
}

impl<'a> ser::Serializer for ValueSerializer<'a> {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec<'a>;
    type SerializeTuple = SerializeVec<'a>;
    type SerializeTupleStruct = SerializeVec<'a>;
    type SerializeTupleVariant = SerializeVec<'a>;
    type SerializeMap = SerializeMap<'a>;
    type SerializeStruct = SerializeMap<'a>;
    type SerializeStructVariant = SerializeMap<'a>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.float(crate::impls::widen_f32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        self.float(v)
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        if name == crate::date::TOKEN {
            return self.date(value);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let inner = to_value(value, self.path.appending(Key::fixed(variant)), self.context)?;
        let mut map = Map::with_capacity(1);
        map.insert(variant.to_string(), inner);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.path, self.context, len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.path, self.context, len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.path, self.context, len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec<'a>> {
        let path = self.path.appending(Key::fixed(variant));
        Ok(SerializeVec::new(path, self.context, len, Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap<'a>> {
        Ok(SerializeMap::new(self.path, self.context, len.unwrap_or(0), None))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap<'a>> {
        Ok(SerializeMap::new(self.path, self.context, len, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap<'a>> {
        let path = self.path.appending(Key::fixed(variant));
        Ok(SerializeMap::new(path, self.context, len, Some(variant)))
    }
}

/// Wraps the contents of an enum variant as `{ "Variant": contents }`.
fn wrap_variant(variant: Option<&'static str>, contents: Value) -> Value {
    match variant {
        Some(variant) => {
            let mut map = Map::with_capacity(1);
            map.insert(variant.to_string(), contents);
            Value::Object(map)
        }
        None => contents,
    }
}

impl<'a> SerializeVec<'a> {
    fn new(path: CodingPath, context: &'a Context, capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            items: Vec::with_capacity(capacity),
            path,
            context,
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let path = self.path.appending(Key::Index(self.items.len()));
        self.items.push(to_value(value, path, self.context)?);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Array(self.items))
    }
}

impl<'a> SerializeMap<'a> {
    fn new(path: CodingPath, context: &'a Context, capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Map::with_capacity(capacity),
            next_key: None,
            path,
            context,
            variant,
        }
    }

    /// Writes a struct field under its strategy-converted name.
    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let path = self.path.appending(Key::fixed(key));
        let tree_key = self.context.key_encoding.apply(key).into_owned();
        let value = to_value(value, path, self.context)?;
        self.map.insert(tree_key, value);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Object(self.map))
    }
}

impl ser::SerializeSeq for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    /// Map keys are data: they are written verbatim, and numbers or booleans
    /// are written as their text.
    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match to_value(key, self.path.clone(), self.context)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(Error::invalid_value(
                    other.kind(),
                    &self.path,
                    "Map keys must be strings, numbers or booleans.",
                ))
            }
        };
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self.next_key.take().ok_or_else(|| {
            Error::invalid_value("value", &self.path, "serialize_value called without serialize_key")
        })?;
        let path = self.path.appending(Key::named(key.clone()));
        let value = to_value(value, path, self.context)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}
