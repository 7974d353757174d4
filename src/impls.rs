//! [`Encode`] and [`Decode`] for standard library types, dates, [`Value`]
//! and serde types.
//!
//! Primitives go through a single value container, sequences through an
//! unkeyed container, and string-keyed maps through a keyed container.
//! Map keys are data rather than field names, so key strategies leave them
//! untouched.

use crate::{CodingKey, Decode, Decoder, Encode, Encoder, Error, Key, Result, Value};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

/// Widens an `f32` to the `f64` with the same shortest decimal form, so that
/// `0.1f32` becomes `0.1` rather than `0.10000000149011612`.
pub(crate) fn widen_f32(value: f32) -> f64 {
    if !value.is_finite() {
        return f64::from(value);
    }
    value
        .to_string()
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(value))
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_bool(*self)
    }
}

impl Decode for bool {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decoder.single_value_container().decode_bool()
    }
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
                    encoder.single_value_container()?.encode_i64(*self as i64)
                }
            }

            impl Decode for $ty {
                fn decode(decoder: &Decoder<'_>) -> Result<Self> {
                    decoder.single_value_container().decode_integer()
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
                    encoder.single_value_container()?.encode_u64(*self as u64)
                }
            }

            impl Decode for $ty {
                fn decode(decoder: &Decoder<'_>) -> Result<Self> {
                    decoder.single_value_container().decode_integer()
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Encode for f64 {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_f64(*self)
    }
}

impl Decode for f64 {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decoder.single_value_container().decode_f64()
    }
}

impl Encode for f32 {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_f32(*self)
    }
}

impl Decode for f32 {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decoder.single_value_container().decode_f32()
    }
}

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_str(self)
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_str(self)
    }
}

impl Decode for String {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decoder.single_value_container().decode_string()
    }
}

impl Encode for char {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder
            .single_value_container()?
            .encode_str(self.encode_utf8(&mut [0; 4]))
    }
}

impl Decode for char {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let text = decoder.single_value_container().decode_str()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::data_corrupted(
                decoder.coding_path(),
                format!("Expected a single character but found `{}`.", text),
            )),
        }
    }
}

impl Encode for Cow<'_, str> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_str(self)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        match self {
            Some(value) => value.encode(encoder),
            None => encoder.single_value_container()?.encode_nil(),
        }
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        if decoder.value().is_null() {
            return Ok(None);
        }
        T::decode(decoder).map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(encoder)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

macro_rules! impl_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Encode + ?Sized> Encode for $ptr<T> {
                fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
                    (**self).encode(encoder)
                }

                fn is_absent(&self) -> bool {
                    (**self).is_absent()
                }
            }

            impl<T: Decode> Decode for $ptr<T> {
                fn decode(decoder: &Decoder<'_>) -> Result<Self> {
                    T::decode(decoder).map($ptr::new)
                }
            }
        )*
    };
}

impl_pointer!(Box, Rc, Arc);

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut container = encoder.unkeyed_container()?;
        for element in self {
            container.encode(element)?;
        }
        Ok(())
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        self.as_slice().encode(encoder)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        self.as_slice().encode(encoder)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let mut container = decoder.unkeyed_container()?;
        let mut elements = Vec::with_capacity(container.count());
        while !container.is_at_end() {
            elements.push(container.decode()?);
        }
        Ok(elements)
    }
}

/// A map key, written and matched verbatim.
struct MapKey(String);

impl CodingKey for MapKey {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(MapKey(name.to_string()))
    }

    fn uses_key_strategy(&self) -> bool {
        false
    }

    fn to_key(&self) -> Key {
        Key::named(self.0.clone())
    }
}

fn encode_entries<'v, V, I>(entries: I, encoder: &mut Encoder<'_>) -> Result<()>
where
    V: Encode + 'v,
    I: IntoIterator<Item = (&'v String, &'v V)>,
{
    let mut container = encoder.container::<MapKey>()?;
    for (key, value) in entries {
        container.encode(value, &MapKey(key.clone()))?;
    }
    Ok(())
}

fn decode_entries<V, M>(decoder: &Decoder<'_>) -> Result<M>
where
    V: Decode,
    M: FromIterator<(String, V)>,
{
    let container = decoder.container::<MapKey>()?;
    container
        .all_keys()
        .into_iter()
        .map(|key| -> Result<(String, V)> {
            let value = container.decode(&key)?;
            Ok((key.0, value))
        })
        .collect()
}

impl<V: Encode, S> Encode for HashMap<String, V, S> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_entries(self, encoder)
    }
}

impl<V: Decode, S: BuildHasher + Default> Decode for HashMap<String, V, S> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decode_entries(decoder)
    }
}

impl<V: Encode> Encode for BTreeMap<String, V> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_entries(self, encoder)
    }
}

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decode_entries(decoder)
    }
}

impl<V: Encode, S> Encode for IndexMap<String, V, S> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encode_entries(self, encoder)
    }
}

impl<V: Decode, S: BuildHasher + Default> Decode for IndexMap<String, V, S> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decode_entries(decoder)
    }
}

impl Encode for Value {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_value(self.clone())
    }
}

impl Decode for Value {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(decoder.value().clone())
    }
}

impl Encode for DateTime<Utc> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.single_value_container()?.encode_date(self)
    }
}

impl Decode for DateTime<Utc> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decoder.single_value_container().decode_date()
    }
}

/// Drives a serde type through the container engine.
///
/// Any `T: Serialize` is [`Encode`] through this wrapper, and any
/// `T: DeserializeOwned` is [`Decode`]. The context's key and float
/// strategies apply to the serde type's fields. Date fields follow the date
/// strategy when marked with `#[serde(with = "serde_codable::date")]`;
/// unmarked `DateTime<Utc>` fields keep chrono's RFC 3339 form.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_codable::{from_str_with_context, to_string_with_context, Context, KeyStrategy, Serde};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Retailer {
///     shop_name: String,
/// }
///
/// let context = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);
/// let json = to_string_with_context(&Serde(Retailer { shop_name: "Aldi".into() }), &context).unwrap();
/// assert_eq!(json, r#"{"shopName":"Aldi"}"#);
///
/// let Serde(back) = from_str_with_context::<Serde<Retailer>>(&json, &context).unwrap();
/// assert_eq!(back.shop_name, "Aldi");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Serde<T>(pub T);

impl<T: serde::Serialize> Encode for Serde<T> {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.encode_serde(&self.0)
    }
}

impl<T: serde::de::DeserializeOwned> Decode for Serde<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        decoder.decode_serde().map(Serde)
    }
}

impl<T> Serde<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_value, from_value_with_context, to_value, to_value_with_context, value, Context, KeyStrategy};

    #[test]
    fn test_widen_f32_keeps_shortest_form() {
        assert_eq!(widen_f32(0.1), 0.1);
        assert_eq!(widen_f32(88.0), 88.0);
        assert!(widen_f32(f32::NAN).is_nan());
        assert_eq!(widen_f32(f32::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_option_null_and_some() {
        assert_eq!(to_value(&Some(3)).unwrap(), value!(3));
        assert_eq!(to_value(&None::<i32>).unwrap(), Value::Null);
        assert_eq!(from_value::<Option<i32>>(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_vec_round_trip() {
        let calories = vec![41u32, 89, 52];
        let value = to_value(&calories).unwrap();
        assert_eq!(value, value!([41, 89, 52]));
        assert_eq!(from_value::<Vec<u32>>(&value).unwrap(), calories);
    }

    #[test]
    fn test_vec_error_path_names_element() {
        let err = from_value::<Vec<u32>>(&value!([1, "two"])).unwrap_err();
        assert_eq!(err.coding_path().as_slice(), &[Key::index(1)]);
    }

    #[test]
    fn test_map_keys_ignore_key_strategy() {
        let mut stock = BTreeMap::new();
        stock.insert("green_apple".to_string(), 3u32);
        let context = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);
        let value = to_value_with_context(&stock, &context).unwrap();
        assert_eq!(value, value!({ "green_apple": 3 }));
        let back: BTreeMap<String, u32> = from_value_with_context(&value, &context).unwrap();
        assert_eq!(back, stock);
    }

    #[test]
    fn test_char() {
        assert_eq!(from_value::<char>(&value!("x")).unwrap(), 'x');
        assert!(matches!(
            from_value::<char>(&value!("xy")),
            Err(Error::DataCorrupted { .. })
        ));
    }

    #[test]
    fn test_value_passes_through() {
        let tree = value!({ "anything": [true, null] });
        assert_eq!(to_value(&tree).unwrap(), tree);
        assert_eq!(from_value::<Value>(&tree).unwrap(), tree);
    }
}
