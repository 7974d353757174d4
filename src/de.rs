//! Serde bridge, decoding side.
//!
//! [`ValueDeserializer`] drives any `T: Deserialize` from a borrowed
//! [`Value`] tree under a [`Context`]: struct field names found in the tree go
//! through the key decoding strategy, non-finite float sentinels decode back to
//! their values, and every error carries the [`CodingPath`] of the node that
//! produced it.
//!
//! Null where a value is required is reported as
//! [`Error::ValueNotFound`], a missing struct field as
//! [`Error::KeyNotFound`], a shape mismatch as [`Error::TypeMismatch`], and an
//! integer that does not fit its target as [`Error::DataCorrupted`], exactly
//! as the container engine reports them.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_codable::{from_str, Error, Key, Serde};
//!
//! #[derive(Deserialize, Debug)]
//! struct Nutrition { carbs: f64 }
//!
//! #[derive(Deserialize, Debug)]
//! struct Vegetable { nutrition: Nutrition }
//!
//! let err = from_str::<Serde<Vegetable>>(r#"{"nutrition": {"carbs": "lots"}}"#).unwrap_err();
//! assert!(matches!(err, Error::TypeMismatch { .. }));
//! assert_eq!(err.coding_path().as_slice(), &[Key::fixed("nutrition"), Key::fixed("carbs")]);
//! ```

use crate::{CodingPath, Context, Decoder, Error, Key, Number, Result, Value};
use chrono::SecondsFormat;
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::borrow::Cow;

/// Deserializes from a borrowed [`Value`] node.
pub struct ValueDeserializer<'a> {
    value: &'a Value,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> ValueDeserializer<'a> {
    pub fn new(value: &'a Value, path: CodingPath, context: &'a Context) -> Self {
        ValueDeserializer { value, path, context }
    }

    fn not_found(&self, expected: &str) -> Error {
        Error::value_not_found(
            expected,
            &self.path,
            format!("Expected {} value but found null instead.", expected),
        )
    }

    fn mismatch(&self, expected: &str) -> Error {
        if self.value.is_null() {
            return self.not_found(expected);
        }
        Error::type_mismatch(
            expected,
            &self.path,
            format!("Expected to decode {} but found {} instead.", expected, self.value.kind()),
        )
    }

    /// Integral floats are accepted for integer targets; fractional ones are
    /// corrupt data.
    fn integer<'de, V: de::Visitor<'de>>(self, expected: &str, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => Err(self.not_found(expected)),
            Value::Number(number @ Number::Float(_)) => {
                if let Some(i) = number.as_i64() {
                    visitor.visit_i64(i)
                } else if let Some(u) = number.as_u64() {
                    visitor.visit_u64(u)
                } else {
                    Err(Error::data_corrupted(
                        &self.path,
                        format!("Parsed number <{}> does not fit in {}.", number, expected),
                    ))
                }
            }
            _ => self.deserialize_any_value(visitor),
        }
    }

    fn float<'de, V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => Err(self.not_found("f64")),
            Value::String(text) => match self.context.non_finite_floats.value_for(text) {
                Some(v) => visitor.visit_f64(v),
                None => Err(self.mismatch("f64")),
            },
            _ => self.deserialize_any_value(visitor),
        }
    }

    fn required<'de, V: de::Visitor<'de>>(self, expected: &str, visitor: V) -> Result<V::Value> {
        if self.value.is_null() {
            return Err(self.not_found(expected));
        }
        self.deserialize_any_value(visitor)
    }

    fn deserialize_any_value<'de, V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(*i),
            Value::Number(Number::Unsigned(u)) => visitor.visit_u64(*u),
            Value::Number(Number::Float(f)) => visitor.visit_f64(*f),
            Value::String(s) => visitor.visit_str(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items, self.path, self.context)),
            Value::Object(map) => {
                let entries = map.iter().map(|(k, v)| (Cow::Borrowed(k.as_str()), v)).collect();
                visitor.visit_map(MapDeserializer::new(entries, self.path, self.context))
            }
        }
    }
}

macro_rules! deserialize_integers {
    ($($method:ident => $ty:literal),*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                self.integer($ty, visitor)
            }
        )*
    };
}

macro_rules! deserialize_required {
    ($($method:ident => $expected:literal),*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                self.required($expected, visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_any_value(visitor)
    }

    deserialize_integers! {
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128"
    }

    deserialize_required! {
        deserialize_bool => "bool",
        deserialize_char => "char",
        deserialize_str => "String",
        deserialize_string => "String",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_seq => "an array",
        deserialize_map => "a dictionary"
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.float(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.float(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    /// Dates marked with [`crate::date`] are read as the date strategy
    /// prescribes.
    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == crate::date::TOKEN {
            let date = Decoder::new(self.value, self.path, self.context)
                .single_value_container()
                .decode_date()?;
            let text = date.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            return visitor.visit_newtype_struct(text.into_deserializer());
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.required("an array", visitor)
    }

    fn deserialize_tuple_struct<V>(self, _name: &'static str, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.required("an array", visitor)
    }

    /// A tree key names the field the key encoding strategy writes under that
    /// key. Other tree keys are matched after the key decoding strategy runs.
    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let map = match self.value {
            Value::Object(map) => map,
            _ => return Err(self.mismatch("a dictionary")),
        };
        let strategy = &self.context.key_decoding;
        let mut entries: Vec<(Cow<'_, str>, &Value)> = Vec::with_capacity(map.len());
        for (tree_key, value) in map {
            let written = fields
                .iter()
                .copied()
                .find(|field| self.context.key_encoding.apply(field) == tree_key.as_str());
            let converted = match written {
                Some(field) => Cow::Borrowed(field),
                None => strategy.apply(tree_key),
            };
            if entries.iter().any(|(seen, _)| *seen == converted) {
                log::warn!(
                    "key `{}` of {} at {} maps onto `{}`, which an earlier key already produced; ignoring it",
                    tree_key,
                    name,
                    self.path,
                    converted
                );
                continue;
            }
            if self.context.deny_unknown_keys && !fields.iter().any(|field| *field == &*converted) {
                return Err(Error::data_corrupted(
                    &self.path.appending(Key::named(tree_key.clone())),
                    format!("Unknown key `{}` for {}.", tree_key, name),
                ));
            }
            entries.push((converted, value));
        }
        visitor.visit_map(MapDeserializer::new(entries, self.path, self.context))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
                path: self.path,
                context: self.context,
            }),
            Value::Object(map) if map.len() == 1 => {
                let (variant, value) = map
                    .iter()
                    .next()
                    .ok_or_else(|| self.mismatch(name))?;
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                    path: self.path,
                    context: self.context,
                })
            }
            _ => Err(self.mismatch(name)),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.mismatch("null")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        identifier
    }
}

struct SeqDeserializer<'a> {
    iter: std::iter::Enumerate<std::slice::Iter<'a, Value>>,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> SeqDeserializer<'a> {
    fn new(items: &'a [Value], path: CodingPath, context: &'a Context) -> Self {
        SeqDeserializer {
            iter: items.iter().enumerate(),
            path,
            context,
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer<'_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((index, value)) => {
                let path = self.path.appending(Key::Index(index));
                seed.deserialize(ValueDeserializer::new(value, path.clone(), self.context))
                    .map(Some)
                    .map_err(|err| err.located(&path))
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer<'a> {
    iter: std::vec::IntoIter<(Cow<'a, str>, &'a Value)>,
    pending: Option<(Cow<'a, str>, &'a Value)>,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> MapDeserializer<'a> {
    fn new(entries: Vec<(Cow<'a, str>, &'a Value)>, path: CodingPath, context: &'a Context) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            pending: None,
            path,
            context,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer<'_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                let decoded = seed.deserialize(MapKeyDeserializer {
                    key: &key,
                    path: &self.path,
                })?;
                self.pending = Some((key, value));
                Ok(Some(decoded))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let (key, value) = self.pending.take().ok_or_else(|| {
            Error::data_corrupted(&self.path, "next_value_seed called before next_key_seed")
        })?;
        let path = self.path.appending(Key::named(key.into_owned()));
        seed.deserialize(ValueDeserializer::new(value, path.clone(), self.context))
            .map_err(|err| err.located(&path))
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Deserializes a map key. Keys are text in the tree; numeric and boolean
/// targets parse that text.
struct MapKeyDeserializer<'k> {
    key: &'k str,
    path: &'k CodingPath,
}

impl MapKeyDeserializer<'_> {
    fn parse<T: std::str::FromStr>(&self, expected: &str) -> Result<T> {
        self.key.parse().map_err(|_| {
            Error::type_mismatch(
                expected,
                self.path,
                format!("Expected a key of type {} but found `{}`.", expected, self.key),
            )
        })
    }
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident : $ty:ty),*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for MapKeyDeserializer<'_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_str(self.key)
    }

    deserialize_parsed_key! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        i128 u128 f32 f64 char str string bytes byte_buf option unit unit_struct
        seq tuple tuple_struct map struct enum identifier ignored_any
    }
}

struct EnumDeserializer<'a> {
    variant: &'a str,
    value: Option<&'a Value>,
    path: CodingPath,
    context: &'a Context,
}

impl<'de, 'a> de::EnumAccess<'de> for EnumDeserializer<'a> {
    type Error = Error;
    type Variant = VariantDeserializer<'a>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(MapKeyDeserializer {
            key: self.variant,
            path: &self.path,
        })?;
        let path = self.path.appending(Key::named(self.variant.to_string()));
        Ok((
            variant,
            VariantDeserializer {
                value: self.value,
                path,
                context: self.context,
            },
        ))
    }
}

struct VariantDeserializer<'a> {
    value: Option<&'a Value>,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> VariantDeserializer<'a> {
    fn contents(self, expected: &str) -> Result<ValueDeserializer<'a>> {
        match self.value {
            Some(value) => Ok(ValueDeserializer::new(value, self.path, self.context)),
            None => Err(Error::type_mismatch(
                expected,
                &self.path,
                format!("Expected {} but found a unit variant.", expected),
            )),
        }
    }
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer<'_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            Some(other) => Err(Error::type_mismatch(
                "unit variant",
                &self.path,
                format!("Expected a unit variant but found {}.", other.kind()),
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        let path = self.path.clone();
        seed.deserialize(self.contents("newtype variant")?)
            .map_err(|err| err.located(&path))
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let path = self.path.clone();
        de::Deserializer::deserialize_tuple(self.contents("tuple variant")?, len, visitor)
            .map_err(|err| err.located(&path))
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let path = self.path.clone();
        de::Deserializer::deserialize_struct(self.contents("struct variant")?, "variant", fields, visitor)
            .map_err(|err| err.located(&path))
    }
}
