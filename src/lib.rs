//! # serde_codable
//!
//! Container-based encoding and decoding of structured data.
//!
//! A type describes how it maps onto a tree by talking to one of three kinds
//! of container: a **keyed** container (a dictionary addressed by
//! [`CodingKey`]s), an **unkeyed** container (an ordered sequence) or a
//! **single-value** container (one primitive). Containers nest, so a type can
//! reshape its data freely: flatten nested input, nest flat fields, iterate
//! keys only known at runtime, or delegate part of its encoding to a base type.
//!
//! Every conversion runs under a [`Context`] whose strategies apply across the
//! whole tree (key casing, date representation, non-finite floats, output
//! formatting) and which carries user options any type may read. Failures are
//! structured [`Error`]s naming what went wrong and the [`CodingPath`] where it
//! happened.
//!
//! ## Deriving
//!
//! The [`codable!`] macro declares a struct and implements [`Encode`] and
//! [`Decode`] for it:
//!
//! ```rust
//! use serde_codable::{codable, decode, encode, Context, KeyStrategy};
//!
//! codable! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Vegetable {
//!         pub name: String,
//!         pub water_content: f64,
//!         pub color: Option<String>,
//!     }
//! }
//!
//! let context = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);
//! let carrot = Vegetable { name: "Carrot".into(), water_content: 88.0, color: None };
//!
//! let bytes = encode(&carrot, &context).unwrap();
//! assert_eq!(bytes, br#"{"name":"Carrot","waterContent":88.0}"#);
//! assert_eq!(decode::<Vegetable>(&bytes, &context).unwrap(), carrot);
//! ```
//!
//! Types that already derive serde's traits take part through [`Serde`].
//!
//! ## Writing containers by hand
//!
//! ```rust
//! use serde_codable::{coding_keys, from_str, to_string};
//! use serde_codable::{Decode, Decoder, Encode, Encoder, Result};
//!
//! coding_keys! {
//!     enum GuitarKey { Brand = "brand", Info = "info" }
//! }
//!
//! coding_keys! {
//!     enum InfoKey { Strings = "strings" }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Guitar { brand: String, strings: u8 }
//!
//! impl Encode for Guitar {
//!     fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
//!         let mut container = encoder.container::<GuitarKey>()?;
//!         container.encode(&self.brand, &GuitarKey::Brand)?;
//!         let mut info = container.nested_container::<InfoKey>(&GuitarKey::Info)?;
//!         info.encode(&self.strings, &InfoKey::Strings)
//!     }
//! }
//!
//! impl Decode for Guitar {
//!     fn decode(decoder: &Decoder<'_>) -> Result<Self> {
//!         let container = decoder.container::<GuitarKey>()?;
//!         let info = container.nested_container::<InfoKey>(&GuitarKey::Info)?;
//!         Ok(Guitar {
//!             brand: container.decode(&GuitarKey::Brand)?,
//!             strings: info.decode(&InfoKey::Strings)?,
//!         })
//!     }
//! }
//!
//! let json = to_string(&Guitar { brand: "Fender".into(), strings: 6 }).unwrap();
//! assert_eq!(json, r#"{"brand":"Fender","info":{"strings":6}}"#);
//! assert_eq!(from_str::<Guitar>(&json).unwrap().strings, 6);
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger:
//! entry points log at `trace`, failed top-level calls at `debug`, and key
//! collisions produced by a key strategy at `warn`.

pub mod context;
pub mod date;
pub mod de;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
mod impls;
pub mod key;
pub mod macros;
pub mod map;
pub mod ser;
pub mod strategy;
pub mod value;

pub use context::{Context, UserInfoKey};
pub use de::ValueDeserializer;
pub use decoder::{
    Decode, Decoder, KeyedDecodingContainer, SingleValueDecodingContainer, UnkeyedDecodingContainer,
};
pub use encoder::{
    Encode, Encoder, KeyedEncodingContainer, SingleValueEncodingContainer, UnkeyedEncodingContainer,
};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use format::{Format, Json};
pub use impls::Serde;
pub use key::{CodingKey, CodingPath, FieldKey, Fields, Key};
pub use map::Map;
pub use ser::ValueSerializer;
pub use strategy::{DateStrategy, KeyStrategy, NonFiniteFloatStrategy, OutputFormatting};
pub use value::{Number, Value};

use std::any::type_name;
use std::io;

/// Encodes `value` to JSON bytes under `context`.
///
/// # Errors
///
/// Returns the first error raised while encoding, an
/// [`Error::InvalidValue`] if `value` encodes nothing at all.
pub fn encode<T>(value: &T, context: &Context) -> Result<Vec<u8>>
where
    T: ?Sized + Encode,
{
    encode_with::<Json, T>(value, context)
}

/// Encodes `value` with the backend `F`.
pub fn encode_with<F, T>(value: &T, context: &Context) -> Result<Vec<u8>>
where
    F: Format,
    T: ?Sized + Encode,
{
    log::trace!("encoding {}", type_name::<T>());
    let bytes = encoder::encode_root(value, context)
        .and_then(|tree| F::print(&tree, &context.output_formatting));
    bytes.map_err(|err| failed("encode", type_name::<T>(), err))
}

/// Decodes a `T` from JSON bytes under `context`.
///
/// # Errors
///
/// Returns [`Error::DataCorrupted`] if `bytes` is not valid JSON, otherwise
/// the first error raised while decoding.
pub fn decode<T>(bytes: &[u8], context: &Context) -> Result<T>
where
    T: Decode,
{
    decode_with::<Json, T>(bytes, context)
}

/// Decodes a `T` with the backend `F`.
pub fn decode_with<F, T>(bytes: &[u8], context: &Context) -> Result<T>
where
    F: Format,
    T: Decode,
{
    log::trace!("decoding {} from {} bytes", type_name::<T>(), bytes.len());
    F::parse(bytes)
        .and_then(|tree| decoder::decode_root(&tree, context))
        .map_err(|err| failed("decode", type_name::<T>(), err))
}

fn failed(operation: &str, target: &str, err: Error) -> Error {
    log::debug!("failed to {} {} at {}: {}", operation, target, err.coding_path(), err);
    err
}

/// Encodes `value` to a JSON string with the default context.
///
/// # Examples
///
/// ```rust
/// use serde_codable::to_string;
/// use std::collections::BTreeMap;
///
/// let mut stock = BTreeMap::new();
/// stock.insert("carrot".to_string(), 12u32);
/// assert_eq!(to_string(&stock).unwrap(), r#"{"carrot":12}"#);
/// ```
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Encode,
{
    to_string_with_context(value, &Context::default())
}

/// Encodes `value` to an indented JSON string with the default context.
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Encode,
{
    let context = Context::new().with_output_formatting(OutputFormatting::pretty());
    to_string_with_context(value, &context)
}

/// Encodes `value` to a JSON string under `context`.
pub fn to_string_with_context<T>(value: &T, context: &Context) -> Result<String>
where
    T: ?Sized + Encode,
{
    let bytes = encode(value, context)?;
    String::from_utf8(bytes).map_err(|err| Error::invalid_value(type_name::<T>(), &[], err.to_string()))
}

/// Encodes `value` to JSON bytes with the default context.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Encode,
{
    encode(value, &Context::default())
}

/// Encodes `value` as JSON into `writer` with the default context.
///
/// # Errors
///
/// Encoding errors as for [`encode`]; a failed write is reported as
/// [`Error::InvalidValue`] at the root.
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Encode,
{
    let bytes = to_vec(value)?;
    writer
        .write_all(&bytes)
        .map_err(|err| Error::invalid_value(type_name::<T>(), &[], err.to_string()))
}

/// Encodes `value` to a [`Value`] tree with the default context.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Encode,
{
    to_value_with_context(value, &Context::default())
}

/// Encodes `value` to a [`Value`] tree under `context`.
pub fn to_value_with_context<T>(value: &T, context: &Context) -> Result<Value>
where
    T: ?Sized + Encode,
{
    log::trace!("encoding {} to a value tree", type_name::<T>());
    encoder::encode_root(value, context).map_err(|err| failed("encode", type_name::<T>(), err))
}

/// Decodes a `T` from JSON text with the default context.
///
/// # Examples
///
/// ```rust
/// use serde_codable::{from_str, ErrorKind};
///
/// let numbers: Vec<u8> = from_str("[1, 2, 3]").unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
///
/// let err = from_str::<Vec<u8>>("[1, 2, 300]").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::DataCorrupted);
/// ```
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: Decode,
{
    decode(text.as_bytes(), &Context::default())
}

/// Decodes a `T` from JSON text under `context`.
pub fn from_str_with_context<T>(text: &str, context: &Context) -> Result<T>
where
    T: Decode,
{
    decode(text.as_bytes(), context)
}

/// Decodes a `T` from JSON bytes with the default context.
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: Decode,
{
    decode(bytes, &Context::default())
}

/// Reads `reader` to the end and decodes a `T` from the JSON it held.
///
/// # Errors
///
/// A failed read is reported as [`Error::DataCorrupted`] carrying the I/O
/// error; decoding errors as for [`decode`].
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: Decode,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| Error::data_corrupted_by(&[], "The data could not be read.", err))?;
    from_slice(&bytes)
}

/// Decodes a `T` from a [`Value`] tree with the default context.
pub fn from_value<T>(value: &Value) -> Result<T>
where
    T: Decode,
{
    from_value_with_context(value, &Context::default())
}

/// Decodes a `T` from a [`Value`] tree under `context`.
pub fn from_value_with_context<T>(value: &Value, context: &Context) -> Result<T>
where
    T: Decode,
{
    log::trace!("decoding {} from a value tree", type_name::<T>());
    decoder::decode_root(value, context).map_err(|err| failed("decode", type_name::<T>(), err))
}
