//! The encoding half of the container protocol.
//!
//! An [`Encoder`] is bound to one empty slot of the output tree. An
//! [`Encode`] impl asks it for exactly one container and writes through
//! that container:
//!
//! - [`KeyedEncodingContainer`]: a map, addressed by a [`CodingKey`] type
//! - [`UnkeyedEncodingContainer`]: an array, appended to in order
//! - [`SingleValueEncodingContainer`]: one primitive leaf
//!
//! Each container records the [`CodingPath`] of the slot it writes to, so
//! errors raised while encoding nested values point at the offending field.
//!
//! ## Examples
//!
//! ```rust
//! use serde_codable::{coding_keys, to_string, Encode, Encoder, Result};
//!
//! coding_keys! {
//!     enum PixelKey { X = "x", Y = "y" }
//! }
//!
//! struct Pixel { x: u32, y: u32 }
//!
//! impl Encode for Pixel {
//!     fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
//!         let mut container = encoder.container::<PixelKey>()?;
//!         container.encode(&self.x, &PixelKey::X)?;
//!         container.encode(&self.y, &PixelKey::Y)
//!     }
//! }
//!
//! assert_eq!(to_string(&Pixel { x: 3, y: 4 }).unwrap(), r#"{"x":3,"y":4}"#);
//! ```

use crate::context::UserInfoKey;
use crate::strategy::seconds_from_date;
use crate::{CodingKey, CodingPath, Context, DateStrategy, Error, Key, Map, Number, Result, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use std::any::Any;
use std::fmt::Write as _;
use std::marker::PhantomData;

/// A type that can write itself through an [`Encoder`].
pub trait Encode {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Whether this value should be left out of a keyed container entirely
    /// when written with
    /// [`encode_field`](KeyedEncodingContainer::encode_field). Only `None`
    /// returns `true`.
    fn is_absent(&self) -> bool {
        false
    }
}

/// Writes one node of the output tree.
pub struct Encoder<'a> {
    slot: &'a mut Value,
    path: CodingPath,
    context: &'a Context,
    written: bool,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(slot: &'a mut Value, path: CodingPath, context: &'a Context) -> Self {
        Encoder {
            slot,
            path,
            context,
            written: false,
        }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    #[must_use]
    pub fn context(&self) -> &'a Context {
        self.context
    }

    #[must_use]
    pub fn user_info<T: Any>(&self, key: &UserInfoKey) -> Option<&'a T> {
        self.context.user_info(key)
    }

    /// Looks up a user option, failing with
    /// [`Error::MissingUserInfo`] at this encoder's path when it is absent.
    pub fn require_user_info<T: Any>(&self, key: &UserInfoKey) -> Result<&'a T> {
        self.context.require_user_info(key, &self.path)
    }

    pub(crate) fn has_written(&self) -> bool {
        self.written
    }

    /// Opens a keyed container at this encoder's slot.
    ///
    /// Calling this again on the same encoder re-opens the same map, so a base
    /// type and a type embedding it can write their fields side by side. Keys
    /// written twice are rejected.
    pub fn container<K: CodingKey>(&mut self) -> Result<KeyedEncodingContainer<'_, K>> {
        let map = object_in(self.slot, &self.path)?;
        self.written = true;
        Ok(KeyedEncodingContainer::new(map, self.path.clone(), self.context))
    }

    /// Opens an unkeyed container at this encoder's slot. Re-opening appends
    /// after the elements already written.
    pub fn unkeyed_container(&mut self) -> Result<UnkeyedEncodingContainer<'_>> {
        let items = array_in(self.slot, &self.path)?;
        self.written = true;
        Ok(UnkeyedEncodingContainer::new(items, self.path.clone(), self.context))
    }

    pub fn single_value_container(&mut self) -> Result<SingleValueEncodingContainer<'_>> {
        if self.written && !self.slot.is_null() {
            return Err(self.occupied("a single value container"));
        }
        self.written = true;
        Ok(SingleValueEncodingContainer::new(
            &mut *self.slot,
            self.path.clone(),
            self.context,
        ))
    }

    /// Writes `value` through its serde `Serialize` impl. Key strategy, float
    /// strategy and path tracking apply as for [`Encode`] impls.
    pub fn encode_serde<T>(&mut self, value: &T) -> Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        if self.written && !self.slot.is_null() {
            return Err(self.occupied("a serde value"));
        }
        *self.slot = crate::ser::to_value(value, self.path.clone(), self.context)?;
        self.written = true;
        Ok(())
    }

    fn occupied(&self, what: &str) -> Error {
        Error::invalid_value(
            self.slot.kind(),
            &self.path,
            format!(
                "Attempt to open {} where {} has already been encoded.",
                what,
                self.slot.kind()
            ),
        )
    }
}

/// Writes the fields of one map, addressed by keys of type `K`.
pub struct KeyedEncodingContainer<'a, K> {
    map: &'a mut Map,
    path: CodingPath,
    context: &'a Context,
    keys: PhantomData<fn(&K)>,
}

impl<'a, K: CodingKey> KeyedEncodingContainer<'a, K> {
    fn new(map: &'a mut Map, path: CodingPath, context: &'a Context) -> Self {
        KeyedEncodingContainer {
            map,
            path,
            context,
            keys: PhantomData,
        }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    /// The name `key` is written under, after the key strategy.
    fn tree_key(&self, key: &K) -> String {
        let name = key.name();
        if key.uses_key_strategy() {
            self.context.key_encoding.apply(&name).into_owned()
        } else {
            name.into_owned()
        }
    }

    /// Reserves a fresh null slot for `tree_key`.
    fn claim(&mut self, tree_key: String, path: &CodingPath) -> Result<&mut Value> {
        if self.map.contains_key(&tree_key) {
            return Err(Error::invalid_value(
                tree_key.clone(),
                path,
                format!("Duplicate key `{}`: a value was already encoded for it.", tree_key),
            ));
        }
        Ok(self.map.slot(tree_key))
    }

    /// Encodes `value` under `key`.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T, key: &K) -> Result<()> {
        let path = self.path.appending(key.to_key());
        let tree_key = self.tree_key(key);
        let context = self.context;
        let slot = self.claim(tree_key, &path)?;
        value.encode(&mut Encoder::new(slot, path, context))
    }

    /// Encodes the value of `value` under `key`, or omits the key entirely
    /// when `value` is `None`.
    pub fn encode_if_present<T: Encode>(&mut self, value: &Option<T>, key: &K) -> Result<()> {
        match value {
            Some(value) => self.encode(value, key),
            None => Ok(()),
        }
    }

    /// Encodes a field whose type may be optional: absent values (`None`) are
    /// omitted, everything else is encoded. Used by [`codable!`](crate::codable).
    pub fn encode_field<T: Encode + ?Sized>(&mut self, value: &T, key: &K) -> Result<()> {
        if value.is_absent() {
            return Ok(());
        }
        self.encode(value, key)
    }

    /// Writes an explicit null under `key`.
    pub fn encode_nil(&mut self, key: &K) -> Result<()> {
        let path = self.path.appending(key.to_key());
        let tree_key = self.tree_key(key);
        self.claim(tree_key, &path).map(|_| ())
    }

    /// Opens a map under `key`. An existing map under `key` is re-opened.
    pub fn nested_container<K2: CodingKey>(&mut self, key: &K) -> Result<KeyedEncodingContainer<'_, K2>> {
        let path = self.path.appending(key.to_key());
        let tree_key = self.tree_key(key);
        let context = self.context;
        let map = object_in(self.reopen(tree_key, &path)?, &path)?;
        Ok(KeyedEncodingContainer::new(map, path, context))
    }

    /// Opens an array under `key`. An existing array under `key` is re-opened.
    pub fn nested_unkeyed_container(&mut self, key: &K) -> Result<UnkeyedEncodingContainer<'_>> {
        let path = self.path.appending(key.to_key());
        let tree_key = self.tree_key(key);
        let context = self.context;
        let items = array_in(self.reopen(tree_key, &path)?, &path)?;
        Ok(UnkeyedEncodingContainer::new(items, path, context))
    }

    /// The slot for a nested container under `tree_key`. A slot already
    /// holding a null was written by another call and is not re-opened.
    fn reopen(&mut self, tree_key: String, path: &CodingPath) -> Result<&mut Value> {
        if matches!(self.map.get(&tree_key), Some(Value::Null)) {
            return self.claim(tree_key, path);
        }
        Ok(self.map.slot(tree_key))
    }

    /// An encoder for the reserved key `"super"`, renamed by the key strategy
    /// like any other key.
    pub fn super_encoder(&mut self) -> Result<Encoder<'_>> {
        let path = self.path.appending(Key::SUPER);
        let context = self.context;
        let tree_key = context.key_encoding.apply("super").into_owned();
        let slot = self.claim(tree_key, &path)?;
        Ok(Encoder::new(slot, path, context))
    }

    /// An encoder for a fresh slot under `key`, for a base value to write
    /// itself into.
    pub fn super_encoder_for_key(&mut self, key: &K) -> Result<Encoder<'_>> {
        let path = self.path.appending(key.to_key());
        let tree_key = self.tree_key(key);
        let context = self.context;
        let slot = self.claim(tree_key, &path)?;
        Ok(Encoder::new(slot, path, context))
    }
}

/// Appends elements to one array.
pub struct UnkeyedEncodingContainer<'a> {
    items: &'a mut Vec<Value>,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> UnkeyedEncodingContainer<'a> {
    fn new(items: &'a mut Vec<Value>, path: CodingPath, context: &'a Context) -> Self {
        UnkeyedEncodingContainer { items, path, context }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    /// The number of elements encoded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    fn push(&mut self) -> (&mut Value, CodingPath) {
        let index = self.items.len();
        self.items.push(Value::Null);
        (&mut self.items[index], self.path.appending(Key::Index(index)))
    }

    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        let context = self.context;
        let (slot, path) = self.push();
        value.encode(&mut Encoder::new(slot, path, context))
    }

    pub fn encode_nil(&mut self) {
        self.push();
    }

    pub fn nested_container<K: CodingKey>(&mut self) -> Result<KeyedEncodingContainer<'_, K>> {
        let context = self.context;
        let (slot, path) = self.push();
        let map = object_in(slot, &path)?;
        Ok(KeyedEncodingContainer::new(map, path, context))
    }

    pub fn nested_unkeyed_container(&mut self) -> Result<UnkeyedEncodingContainer<'_>> {
        let context = self.context;
        let (slot, path) = self.push();
        let items = array_in(slot, &path)?;
        Ok(UnkeyedEncodingContainer::new(items, path, context))
    }

    /// An encoder for the next element.
    pub fn super_encoder(&mut self) -> Encoder<'_> {
        let context = self.context;
        let (slot, path) = self.push();
        Encoder::new(slot, path, context)
    }
}

/// Writes exactly one primitive value.
pub struct SingleValueEncodingContainer<'a> {
    slot: &'a mut Value,
    path: CodingPath,
    context: &'a Context,
    encoded: bool,
}

impl<'a> SingleValueEncodingContainer<'a> {
    fn new(slot: &'a mut Value, path: CodingPath, context: &'a Context) -> Self {
        SingleValueEncodingContainer {
            slot,
            path,
            context,
            encoded: false,
        }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    fn claim(&mut self) -> Result<()> {
        if self.encoded {
            return Err(Error::invalid_value(
                self.slot.kind(),
                &self.path,
                "Attempt to encode a second value through a single value container.",
            ));
        }
        self.encoded = true;
        Ok(())
    }

    fn put(&mut self, value: Value) -> Result<()> {
        self.claim()?;
        *self.slot = value;
        Ok(())
    }

    pub fn encode_nil(&mut self) -> Result<()> {
        self.put(Value::Null)
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<()> {
        self.put(Value::Bool(value))
    }

    pub fn encode_i64(&mut self, value: i64) -> Result<()> {
        self.put(Value::Number(Number::Integer(value)))
    }

    pub fn encode_u64(&mut self, value: u64) -> Result<()> {
        self.put(Value::Number(Number::from(value)))
    }

    /// Encodes a float. Non-finite values follow the context's
    /// [`NonFiniteFloatStrategy`](crate::NonFiniteFloatStrategy).
    pub fn encode_f64(&mut self, value: f64) -> Result<()> {
        if value.is_finite() {
            return self.put(Value::Number(Number::Float(value)));
        }
        match self.context.non_finite_floats.sentinel_for(value) {
            Some(sentinel) => {
                let sentinel = sentinel.to_string();
                self.put(Value::String(sentinel))
            }
            None => Err(Error::invalid_value(
                value.to_string(),
                &self.path,
                format!(
                    "Unable to encode {} directly. Use NonFiniteFloatStrategy::ConvertToString \
                     to specify how the value should be encoded.",
                    value
                ),
            )),
        }
    }

    /// Encodes an `f32` as the `f64` with the same shortest decimal form, so
    /// `0.1f32` is written as `0.1`.
    pub fn encode_f32(&mut self, value: f32) -> Result<()> {
        self.encode_f64(crate::impls::widen_f32(value))
    }

    pub fn encode_str(&mut self, value: &str) -> Result<()> {
        self.put(Value::String(value.to_string()))
    }

    /// Writes a tree node as-is.
    pub fn encode_value(&mut self, value: Value) -> Result<()> {
        self.put(value)
    }

    /// Encodes any [`Encode`] value into this container's slot.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.claim()?;
        value.encode(&mut Encoder::new(&mut *self.slot, self.path.clone(), self.context))
    }

    /// Encodes a date as the context's [`DateStrategy`] prescribes.
    pub fn encode_date(&mut self, date: &DateTime<Utc>) -> Result<()> {
        let context = self.context;
        match &context.date_strategy {
            DateStrategy::DeferredToDate => {
                self.claim()?;
                *self.slot = crate::ser::to_value(date, self.path.clone(), context)?;
                Ok(())
            }
            DateStrategy::SecondsSince1970 => self.encode_f64(seconds_from_date(date)),
            DateStrategy::MillisecondsSince1970 => self.encode_f64(seconds_from_date(date) * 1000.0),
            DateStrategy::Iso8601 => self.put(Value::String(date.to_rfc3339_opts(SecondsFormat::Secs, true))),
            DateStrategy::Formatted(format) => {
                let mut text = String::new();
                if write!(text, "{}", date.format(format)).is_err() {
                    return Err(Error::invalid_value(
                        date.to_rfc3339(),
                        &self.path,
                        format!("Date format `{}` is not valid.", format),
                    ));
                }
                self.put(Value::String(text))
            }
            DateStrategy::Custom { encode, .. } => {
                self.claim()?;
                encode(date, &mut Encoder::new(&mut *self.slot, self.path.clone(), context))
            }
        }
    }
}

/// Turns a null slot into an empty map; an existing map is re-opened.
fn object_in<'v>(slot: &'v mut Value, path: &CodingPath) -> Result<&'v mut Map> {
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_value(
            other.kind(),
            path,
            format!("Cannot open a keyed container where {} was already encoded.", other.kind()),
        )),
    }
}

fn array_in<'v>(slot: &'v mut Value, path: &CodingPath) -> Result<&'v mut Vec<Value>> {
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => Ok(items),
        other => Err(Error::invalid_value(
            other.kind(),
            path,
            format!("Cannot open an unkeyed container where {} was already encoded.", other.kind()),
        )),
    }
}

/// Encodes `value` into a fresh tree.
pub(crate) fn encode_root<T: Encode + ?Sized>(value: &T, context: &Context) -> Result<Value> {
    let mut root = Value::Null;
    let mut encoder = Encoder::new(&mut root, CodingPath::root(), context);
    value.encode(&mut encoder)?;
    if !encoder.has_written() {
        return Err(Error::invalid_value(
            std::any::type_name::<T>(),
            &[],
            format!(
                "Top-level {} did not encode any values.",
                std::any::type_name::<T>()
            ),
        ));
    }
    Ok(root)
}
