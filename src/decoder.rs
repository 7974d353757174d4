//! The decoding half of the container protocol.
//!
//! A [`Decoder`] is bound to one node of the input tree. A [`Decode`] impl
//! asks it for a view of that node:
//!
//! - [`KeyedDecodingContainer`]: the node is a map, read by [`CodingKey`]
//! - [`UnkeyedDecodingContainer`]: the node is an array, read with a cursor
//! - [`SingleValueDecodingContainer`]: the node is one primitive
//!
//! Every read appends its key to the coding path before descending, so an
//! error deep inside the tree names the exact field that failed.
//!
//! ## Examples
//!
//! ```rust
//! use serde_codable::{coding_keys, from_str, Decode, Decoder, Result};
//!
//! coding_keys! {
//!     enum RockStarKey { Name = "name", Age = "age" }
//! }
//!
//! struct RockStar { name: String, age: Option<u32> }
//!
//! impl Decode for RockStar {
//!     fn decode(decoder: &Decoder<'_>) -> Result<Self> {
//!         let container = decoder.container::<RockStarKey>()?;
//!         Ok(RockStar {
//!             name: container.decode(&RockStarKey::Name)?,
//!             age: container.decode_if_present(&RockStarKey::Age)?,
//!         })
//!     }
//! }
//!
//! let star: RockStar = from_str(r#"{"name": "Freddie"}"#).unwrap();
//! assert_eq!(star.name, "Freddie");
//! assert_eq!(star.age, None);
//! ```

use crate::context::UserInfoKey;
use crate::strategy::{date_from_seconds, parse_formatted_date};
use crate::{CodingKey, CodingPath, Context, DateStrategy, Error, Key, Map, Number, Result, Value};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::any::{type_name, Any};
use std::borrow::Cow;
use std::marker::PhantomData;

static NULL: Value = Value::Null;

/// A type that can read itself through a [`Decoder`].
pub trait Decode: Sized {
    fn decode(decoder: &Decoder<'_>) -> Result<Self>;

    /// The value to use when a keyed container has no entry for this type's
    /// key and the field is read with
    /// [`decode_field`](KeyedDecodingContainer::decode_field). `Option<T>`
    /// returns `Some(None)`; every other type is required.
    fn absent() -> Option<Self> {
        None
    }
}

/// Reads one node of the input tree.
#[derive(Clone)]
pub struct Decoder<'a> {
    value: &'a Value,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(value: &'a Value, path: CodingPath, context: &'a Context) -> Self {
        Decoder { value, path, context }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    #[must_use]
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// The raw node this decoder is bound to.
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    #[must_use]
    pub fn user_info<T: Any>(&self, key: &UserInfoKey) -> Option<&'a T> {
        self.context.user_info(key)
    }

    /// Looks up a user option, failing with
    /// [`Error::MissingUserInfo`] at this decoder's path when it is absent.
    pub fn require_user_info<T: Any>(&self, key: &UserInfoKey) -> Result<&'a T> {
        self.context.require_user_info(key, &self.path)
    }

    /// A keyed view of this node.
    ///
    /// Fails with [`Error::ValueNotFound`] when the node is null and with
    /// [`Error::TypeMismatch`] when it is not a map.
    pub fn container<K: CodingKey>(&self) -> Result<KeyedDecodingContainer<'a, K>> {
        match self.value {
            Value::Object(map) => KeyedDecodingContainer::new(map, self.path.clone(), self.context),
            other => Err(shape_error(other, "a dictionary", &self.path, "keyed")),
        }
    }

    pub fn unkeyed_container(&self) -> Result<UnkeyedDecodingContainer<'a>> {
        match self.value {
            Value::Array(items) => Ok(UnkeyedDecodingContainer::new(items, self.path.clone(), self.context)),
            other => Err(shape_error(other, "an array", &self.path, "unkeyed")),
        }
    }

    #[must_use]
    pub fn single_value_container(&self) -> SingleValueDecodingContainer<'a> {
        SingleValueDecodingContainer::new(self.value, self.path.clone(), self.context)
    }

    /// Reads this node through `T`'s serde `Deserialize` impl. Key strategy,
    /// float strategy and path tracking apply as for [`Decode`] impls.
    pub fn decode_serde<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        T::deserialize(crate::de::ValueDeserializer::new(self.value, self.path.clone(), self.context))
            .map_err(|err| err.located(&self.path))
    }
}

/// Whether a tree key names a key of `K`, either as the name `K` would be
/// written under or as rewritten by the decoding strategy.
fn is_known<K: CodingKey>(tree_key: &str, converted: &str, context: &Context) -> bool {
    K::from_name(converted).is_some()
        || K::from_name(tree_key).is_some()
        || K::declared_names()
            .iter()
            .any(|name| context.key_encoding.apply(name) == tree_key)
}

fn shape_error(found: &Value, expected: &str, path: &CodingPath, container: &str) -> Error {
    if found.is_null() {
        Error::value_not_found(
            expected,
            path,
            format!("Cannot get {} decoding container -- found null value instead.", container),
        )
    } else {
        Error::type_mismatch(
            expected,
            path,
            format!("Expected to decode {} but found {} instead.", expected, found.kind()),
        )
    }
}

/// Reads the entries of one map by keys of type `K`.
///
/// A key is found under the name the context's encoding strategy gives it,
/// so output written with a context reads back with the same context. When
/// that name is absent, the key is matched against the tree keys as rewritten
/// by the decoding strategy.
pub struct KeyedDecodingContainer<'a, K> {
    map: &'a Map,
    /// Tree entries under the names produced by the decoding strategy.
    entries: IndexMap<Cow<'a, str>, &'a Value>,
    path: CodingPath,
    context: &'a Context,
    keys: PhantomData<fn() -> K>,
}

impl<'a, K: CodingKey> KeyedDecodingContainer<'a, K> {
    fn new(map: &'a Map, path: CodingPath, context: &'a Context) -> Result<Self> {
        let strategy = &context.key_decoding;
        let mut entries = IndexMap::with_capacity(map.len());
        for (tree_key, value) in map {
            let converted = strategy.apply(tree_key);
            if context.deny_unknown_keys && !is_known::<K>(tree_key, &converted, context) {
                return Err(Error::data_corrupted(
                    &path.appending(Key::named(tree_key.clone())),
                    format!("Unknown key `{}`.", tree_key),
                ));
            }
            if entries.contains_key(&*converted) {
                log::warn!(
                    "key `{}` at {} maps onto `{}`, which an earlier key already produced; ignoring it",
                    tree_key,
                    path,
                    converted
                );
                continue;
            }
            entries.insert(converted, value);
        }
        Ok(KeyedDecodingContainer {
            map,
            entries,
            path,
            context,
            keys: PhantomData,
        })
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    /// Every key of the map that `K` can represent, in the order they appear
    /// in the input.
    #[must_use]
    pub fn all_keys(&self) -> Vec<K> {
        self.map
            .iter()
            .filter_map(|(raw, value)| self.key_for(raw, value))
            .collect()
    }

    fn key_for(&self, raw: &str, value: &Value) -> Option<K> {
        let encoding = &self.context.key_encoding;
        if let Some(name) = K::declared_names().iter().find(|name| encoding.apply(name) == raw) {
            return K::from_name(name);
        }
        let converted = self.context.key_decoding.apply(raw);
        match K::from_name(&converted) {
            Some(key) if key.uses_key_strategy() => {
                // Only the entry that won a strategy collision is reported.
                let kept = self
                    .entries
                    .get(&*converted)
                    .map_or(false, |kept| std::ptr::eq(*kept, value));
                kept.then_some(key)
            }
            _ => K::from_name(raw).filter(|key| !key.uses_key_strategy()),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    fn lookup(&self, key: &K) -> Option<&'a Value> {
        self.find(&key.name(), key.uses_key_strategy())
    }

    fn find(&self, name: &str, uses_key_strategy: bool) -> Option<&'a Value> {
        if !uses_key_strategy {
            return self.map.get(name);
        }
        let written = self.context.key_encoding.apply(name);
        self.map
            .get(&written)
            .or_else(|| self.entries.get(name).copied())
    }

    fn require(&self, key: &K) -> Result<&'a Value> {
        self.lookup(key)
            .ok_or_else(|| Error::key_not_found(key.to_key(), &self.path))
    }

    fn decoder_for(&self, value: &'a Value, key: &K) -> Decoder<'a> {
        Decoder::new(value, self.path.appending(key.to_key()), self.context)
    }

    /// Decodes the value under `key`. Fails with [`Error::KeyNotFound`] when
    /// the key is absent.
    pub fn decode<T: Decode>(&self, key: &K) -> Result<T> {
        let value = self.require(key)?;
        T::decode(&self.decoder_for(value, key))
    }

    /// Decodes the value under `key`, or returns `None` when the key is absent
    /// or its value is null.
    pub fn decode_if_present<T: Decode>(&self, key: &K) -> Result<Option<T>> {
        match self.lookup(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::decode(&self.decoder_for(value, key)).map(Some),
        }
    }

    /// Decodes a field whose type may be optional: a missing key yields
    /// [`Decode::absent`] when the type has one. Used by [`codable!`](crate::codable).
    pub fn decode_field<T: Decode>(&self, key: &K) -> Result<T> {
        match self.lookup(key) {
            Some(value) => T::decode(&self.decoder_for(value, key)),
            None => T::absent().ok_or_else(|| Error::key_not_found(key.to_key(), &self.path)),
        }
    }

    /// Whether the value under `key` is null.
    pub fn decode_nil(&self, key: &K) -> Result<bool> {
        self.require(key).map(Value::is_null)
    }

    pub fn nested_container<K2: CodingKey>(&self, key: &K) -> Result<KeyedDecodingContainer<'a, K2>> {
        let value = self.require(key)?;
        self.decoder_for(value, key).container()
    }

    pub fn nested_unkeyed_container(&self, key: &K) -> Result<UnkeyedDecodingContainer<'a>> {
        let value = self.require(key)?;
        self.decoder_for(value, key).unkeyed_container()
    }

    /// A decoder for the reserved key `"super"`, or over null when it is absent.
    #[must_use]
    pub fn super_decoder(&self) -> Decoder<'a> {
        let value = self.find("super", true).unwrap_or(&NULL);
        Decoder::new(value, self.path.appending(Key::SUPER), self.context)
    }

    /// A decoder for the value under `key`, or over null when it is absent.
    #[must_use]
    pub fn super_decoder_for_key(&self, key: &K) -> Decoder<'a> {
        let value = self.lookup(key).unwrap_or(&NULL);
        self.decoder_for(value, key)
    }
}

/// Reads the elements of one array in order.
///
/// The cursor only advances when a read succeeds.
pub struct UnkeyedDecodingContainer<'a> {
    items: &'a [Value],
    current: usize,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> UnkeyedDecodingContainer<'a> {
    fn new(items: &'a [Value], path: CodingPath, context: &'a Context) -> Self {
        UnkeyedDecodingContainer {
            items,
            current: 0,
            path,
            context,
        }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current >= self.items.len()
    }

    fn current_path(&self) -> CodingPath {
        self.path.appending(Key::Index(self.current))
    }

    fn peek(&self, expected: &str) -> Result<&'a Value> {
        self.items.get(self.current).ok_or_else(|| {
            Error::value_not_found(expected, &self.current_path(), "Unkeyed container is at end.")
        })
    }

    fn current_decoder(&self, expected: &str) -> Result<Decoder<'a>> {
        let value = self.peek(expected)?;
        Ok(Decoder::new(value, self.current_path(), self.context))
    }

    pub fn decode<T: Decode>(&mut self) -> Result<T> {
        let decoded = T::decode(&self.current_decoder(type_name::<T>())?)?;
        self.current += 1;
        Ok(decoded)
    }

    /// Returns `None` at the end of the array or for a null element, which is
    /// skipped.
    pub fn decode_if_present<T: Decode>(&mut self) -> Result<Option<T>> {
        let items = self.items;
        match items.get(self.current) {
            None => Ok(None),
            Some(Value::Null) => {
                self.current += 1;
                Ok(None)
            }
            Some(_) => self.decode().map(Some),
        }
    }

    /// Consumes the current element if it is null.
    pub fn decode_nil(&mut self) -> Result<bool> {
        if self.peek("null")?.is_null() {
            self.current += 1;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn nested_container<K: CodingKey>(&mut self) -> Result<KeyedDecodingContainer<'a, K>> {
        let container = self.current_decoder("a dictionary")?.container()?;
        self.current += 1;
        Ok(container)
    }

    pub fn nested_unkeyed_container(&mut self) -> Result<UnkeyedDecodingContainer<'a>> {
        let container = self.current_decoder("an array")?.unkeyed_container()?;
        self.current += 1;
        Ok(container)
    }

    /// A decoder for the current element.
    pub fn super_decoder(&mut self) -> Result<Decoder<'a>> {
        let decoder = self.current_decoder("a value")?;
        self.current += 1;
        Ok(decoder)
    }
}

/// Reads one primitive value.
pub struct SingleValueDecodingContainer<'a> {
    value: &'a Value,
    path: CodingPath,
    context: &'a Context,
}

impl<'a> SingleValueDecodingContainer<'a> {
    fn new(value: &'a Value, path: CodingPath, context: &'a Context) -> Self {
        SingleValueDecodingContainer { value, path, context }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The error for a node that is not `expected`: null is reported as
    /// [`Error::ValueNotFound`], any other shape as [`Error::TypeMismatch`].
    #[must_use]
    pub fn mismatch(&self, expected: &str) -> Error {
        if self.value.is_null() {
            Error::value_not_found(
                expected,
                &self.path,
                format!("Expected {} value but found null instead.", expected),
            )
        } else {
            Error::type_mismatch(
                expected,
                &self.path,
                format!("Expected to decode {} but found {} instead.", expected, self.value.kind()),
            )
        }
    }

    #[must_use]
    pub fn decode_nil(&self) -> bool {
        self.value.is_null()
    }

    pub fn decode_bool(&self) -> Result<bool> {
        self.value.as_bool().ok_or_else(|| self.mismatch("bool"))
    }

    /// Decodes an integer of type `T`. Numbers that do not fit in `T` or have
    /// a fractional part fail with [`Error::DataCorrupted`].
    pub fn decode_integer<T>(&self) -> Result<T>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let number = match self.value {
            Value::Number(number) => *number,
            _ => return Err(self.mismatch(type_name::<T>())),
        };
        let converted = match number {
            Number::Integer(i) => T::try_from(i).ok(),
            Number::Unsigned(u) => T::try_from(u).ok(),
            Number::Float(_) => number
                .as_i64()
                .and_then(|i| T::try_from(i).ok())
                .or_else(|| number.as_u64().and_then(|u| T::try_from(u).ok())),
        };
        converted.ok_or_else(|| {
            Error::data_corrupted(
                &self.path,
                format!("Parsed number <{}> does not fit in {}.", number, type_name::<T>()),
            )
        })
    }

    pub fn decode_i64(&self) -> Result<i64> {
        self.decode_integer()
    }

    pub fn decode_u64(&self) -> Result<u64> {
        self.decode_integer()
    }

    /// Decodes a float. Strings matching the context's non-finite sentinels
    /// decode to the matching infinity or NaN.
    pub fn decode_f64(&self) -> Result<f64> {
        match self.value {
            Value::Number(number) => Ok(number.as_f64()),
            Value::String(text) => self
                .context
                .non_finite_floats
                .value_for(text)
                .ok_or_else(|| self.mismatch("f64")),
            _ => Err(self.mismatch("f64")),
        }
    }

    pub fn decode_f32(&self) -> Result<f32> {
        let value = self.decode_f64()?;
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return Err(Error::data_corrupted(
                &self.path,
                format!("Parsed number <{}> does not fit in f32.", value),
            ));
        }
        Ok(value as f32)
    }

    pub fn decode_str(&self) -> Result<&'a str> {
        self.value.as_str().ok_or_else(|| self.mismatch("String"))
    }

    pub fn decode_string(&self) -> Result<String> {
        self.decode_str().map(str::to_string)
    }

    /// Decodes any [`Decode`] value from this container's node.
    pub fn decode<T: Decode>(&self) -> Result<T> {
        T::decode(&Decoder::new(self.value, self.path.clone(), self.context))
    }

    /// Decodes a date as the context's [`DateStrategy`] prescribes.
    pub fn decode_date(&self) -> Result<DateTime<Utc>> {
        match &self.context.date_strategy {
            DateStrategy::DeferredToDate => {
                Decoder::new(self.value, self.path.clone(), self.context).decode_serde()
            }
            DateStrategy::SecondsSince1970 => {
                let seconds = self.decode_f64()?;
                date_from_seconds(seconds).ok_or_else(|| self.invalid_date(seconds))
            }
            DateStrategy::MillisecondsSince1970 => {
                let millis = self.decode_f64()?;
                date_from_seconds(millis / 1000.0).ok_or_else(|| self.invalid_date(millis))
            }
            DateStrategy::Iso8601 => {
                let text = self.decode_str()?;
                DateTime::parse_from_rfc3339(text)
                    .map(|date| date.with_timezone(&Utc))
                    .map_err(|err| {
                        Error::data_corrupted_by(
                            &self.path,
                            "Expected date string to be ISO8601-formatted.",
                            err,
                        )
                    })
            }
            DateStrategy::Formatted(format) => {
                let text = self.decode_str()?;
                parse_formatted_date(text, format).ok_or_else(|| {
                    Error::data_corrupted(
                        &self.path,
                        format!("Date string `{}` does not match the format `{}`.", text, format),
                    )
                })
            }
            DateStrategy::Custom { decode, .. } => {
                decode(&Decoder::new(self.value, self.path.clone(), self.context))
            }
        }
    }

    fn invalid_date(&self, number: f64) -> Error {
        Error::data_corrupted(&self.path, format!("Number {} is not a valid date.", number))
    }
}

/// Decodes a `T` from the root of `value`.
pub(crate) fn decode_root<T: Decode>(value: &Value, context: &Context) -> Result<T> {
    T::decode(&Decoder::new(value, CodingPath::root(), context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coding_keys, value, KeyStrategy, NonFiniteFloatStrategy};

    fn keyed<'a>(value: &'a Value, context: &'a Context) -> KeyedDecodingContainer<'a, Key> {
        Decoder::new(value, CodingPath::root(), context).container().unwrap()
    }

    #[test]
    fn test_missing_key_vs_null() {
        let value = value!({ "name": null });
        let context = Context::new();
        let container = keyed(&value, &context);

        let err = container.decode::<String>(&Key::fixed("age")).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { .. }));
        assert_eq!(err.coding_path().as_slice(), &[Key::fixed("age")]);

        let err = container.decode::<String>(&Key::fixed("name")).unwrap_err();
        assert!(matches!(err, Error::ValueNotFound { .. }));

        assert_eq!(container.decode_if_present::<String>(&Key::fixed("name")).unwrap(), None);
        assert_eq!(container.decode_if_present::<String>(&Key::fixed("age")).unwrap(), None);
        assert!(container.decode_nil(&Key::fixed("name")).unwrap());
    }

    #[test]
    fn test_all_keys_in_input_order() {
        let value = value!({ "vocals": {}, "guitar": {}, "drums": {} });
        let context = Context::new();
        let names: Vec<String> = keyed(&value, &context)
            .all_keys()
            .iter()
            .map(|key| key.to_string())
            .collect();
        assert_eq!(names, ["vocals", "guitar", "drums"]);
    }

    #[test]
    fn test_key_strategy_applies_to_tree_keys() {
        let value = value!({ "isDelicious": true });
        let context = Context::new().with_key_decoding(KeyStrategy::CamelToSnake);
        let container = keyed(&value, &context);
        assert!(container.decode::<bool>(&Key::fixed("is_delicious")).unwrap());
        // The name as written in the tree is found as well.
        assert!(container.contains(&Key::fixed("isDelicious")));
        assert!(!container.contains(&Key::fixed("delicious")));
    }

    coding_keys! {
        enum FruitKey { Name = "name", IsDelicious = "isDelicious" }
    }

    #[test]
    fn test_camel_case_keys_read_back_under_snake_to_camel() {
        let value = value!({ "name": "Mango", "isDelicious": true });
        let context = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);
        let container = Decoder::new(&value, CodingPath::root(), &context)
            .container::<FruitKey>()
            .unwrap();
        assert!(container.decode::<bool>(&FruitKey::IsDelicious).unwrap());
        assert_eq!(container.all_keys(), [FruitKey::Name, FruitKey::IsDelicious]);
    }

    #[test]
    fn test_custom_key_strategy_reads_back() {
        let context = Context::new()
            .with_key_strategy(KeyStrategy::custom(|name| name.to_uppercase()))
            .with_deny_unknown_keys(true);

        let value = value!({ "NAME": "Mango", "ISDELICIOUS": true });
        let container = Decoder::new(&value, CodingPath::root(), &context)
            .container::<FruitKey>()
            .unwrap();
        assert_eq!(container.decode::<String>(&FruitKey::Name).unwrap(), "Mango");
        assert!(container.decode::<bool>(&FruitKey::IsDelicious).unwrap());

        let value = value!({ "SUPER": { "ID": 7 } });
        let base = keyed(&value, &context).super_decoder();
        let id: u8 = base.container::<Key>().unwrap().decode(&Key::fixed("id")).unwrap();
        assert_eq!(id, 7);
    }

    #[test]
    fn test_unknown_keys_can_be_denied() {
        let value = value!({ "name": "x" });
        let context = Context::new().with_deny_unknown_keys(true);
        // Dynamic keys accept every name.
        assert!(Decoder::new(&value, CodingPath::root(), &context)
            .container::<Key>()
            .is_ok());
    }

    #[test]
    fn test_unkeyed_cursor_advances_only_on_success() {
        let value = value!([1, "two", null]);
        let context = Context::new();
        let decoder = Decoder::new(&value, CodingPath::root(), &context);
        let mut items = decoder.unkeyed_container().unwrap();

        assert_eq!(items.count(), 3);
        assert_eq!(items.decode::<i64>().unwrap(), 1);
        let err = items.decode::<i64>().unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(err.coding_path().as_slice(), &[Key::index(1)]);
        assert_eq!(items.current_index(), 1);

        assert_eq!(items.decode::<String>().unwrap(), "two");
        assert!(items.decode_nil().unwrap());
        assert!(items.is_at_end());

        let err = items.decode::<i64>().unwrap_err();
        assert!(matches!(err, Error::ValueNotFound { .. }));
        assert_eq!(err.coding_path().as_slice(), &[Key::index(3)]);
    }

    #[test]
    fn test_integer_range_is_checked() {
        let value = value!(300);
        let context = Context::new();
        let single = Decoder::new(&value, CodingPath::root(), &context).single_value_container();
        assert_eq!(single.decode_integer::<u16>().unwrap(), 300);
        let err = single.decode_integer::<u8>().unwrap_err();
        assert!(matches!(err, Error::DataCorrupted { .. }));

        let fractional = value!(74.5);
        let single = Decoder::new(&fractional, CodingPath::root(), &context).single_value_container();
        assert!(matches!(single.decode_i64(), Err(Error::DataCorrupted { .. })));
    }

    #[test]
    fn test_scalar_mismatch_reports_leaf_path() {
        let value = value!({ "crop": { "weight": "heavy", "organic": 1 } });
        let context = Context::new();
        let crop = keyed(&value, &context).nested_container::<Key>(&Key::fixed("crop")).unwrap();

        for err in [
            crop.decode::<i64>(&Key::fixed("weight")).unwrap_err(),
            crop.decode::<f64>(&Key::fixed("weight")).unwrap_err(),
            crop.decode::<bool>(&Key::fixed("organic")).unwrap_err(),
            crop.decode::<String>(&Key::fixed("organic")).unwrap_err(),
        ] {
            assert!(matches!(err, Error::TypeMismatch { .. }));
            assert_eq!(err.coding_path().as_slice().len(), 2);
            assert_eq!(err.coding_path().as_slice()[0], Key::fixed("crop"));
        }
    }

    #[test]
    fn test_non_finite_sentinel_decodes() {
        let value = value!("+inf+");
        let context = Context::new()
            .with_non_finite_floats(NonFiniteFloatStrategy::convert_to_string("+inf+", "-inf-", "NaN"));
        let single = Decoder::new(&value, CodingPath::root(), &context).single_value_container();
        assert_eq!(single.decode_f64().unwrap(), f64::INFINITY);

        let plain = Context::new();
        let single = Decoder::new(&value, CodingPath::root(), &plain).single_value_container();
        assert!(matches!(single.decode_f64(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_super_decoder_for_missing_key_is_null() {
        let value = value!({});
        let context = Context::new();
        let container = keyed(&value, &context);
        let decoder = container.super_decoder();
        assert!(decoder.value().is_null());
        assert_eq!(decoder.coding_path().as_slice(), &[Key::SUPER]);
    }

    #[test]
    fn test_dates_follow_strategy() {
        let seconds = value!(1522324117.0);
        let context = Context::new().with_date_strategy(DateStrategy::SecondsSince1970);
        let single = Decoder::new(&seconds, CodingPath::root(), &context).single_value_container();
        assert_eq!(single.decode_date().unwrap().timestamp(), 1_522_324_117);

        let text = value!("not a date");
        let context = Context::new().with_date_strategy(DateStrategy::Iso8601);
        let single = Decoder::new(&text, CodingPath::root(), &context).single_value_container();
        let err = single.decode_date().unwrap_err();
        assert!(matches!(err, Error::DataCorrupted { .. }));
        assert!(err.underlying().is_some());
    }
}
