//! Byte-level backends.
//!
//! The engine only ever talks to a backend through [`Format`]: bytes in,
//! [`Value`] out, and back. [`Json`] is the backend behind the crate's
//! top-level functions.

use crate::{CodingPath, Error, Key, OutputFormatting, Result, Value};
use serde::Serialize;

/// A tree-shaped text format that values can be parsed from and printed to.
pub trait Format {
    /// Parses `bytes` into a value tree.
    fn parse(bytes: &[u8]) -> Result<Value>;

    /// Prints `value`, shaped by `formatting`.
    fn print(value: &Value, formatting: &OutputFormatting) -> Result<Vec<u8>>;
}

/// JSON, backed by `serde_json`.
///
/// ```rust
/// use serde_codable::{value, Format, Json, OutputFormatting};
///
/// let tree = Json::parse(br#"{"b": 1, "a": [true, null]}"#).unwrap();
/// assert_eq!(tree, value!({ "b": 1, "a": [true, null] }));
///
/// let sorted = OutputFormatting::compact().with_sorted_keys(true);
/// assert_eq!(Json::print(&tree, &sorted).unwrap(), br#"{"a":[true,null],"b":1}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Format for Json {
    fn parse(bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|err| {
            Error::data_corrupted_by(&[], "The given data was not valid JSON.", err)
        })
    }

    fn print(value: &Value, formatting: &OutputFormatting) -> Result<Vec<u8>> {
        check_finite(value, &CodingPath::root())?;

        let mut sorted;
        let value = if formatting.sorted_keys {
            sorted = value.clone();
            sorted.sort_keys_recursive();
            &sorted
        } else {
            value
        };

        let mut out = Vec::with_capacity(128);
        let written = if formatting.pretty {
            let indent = vec![b' '; formatting.indent];
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            value.serialize(&mut serializer)
        } else {
            let mut serializer = serde_json::Serializer::new(&mut out);
            value.serialize(&mut serializer)
        };
        written.map_err(|err| Error::invalid_value(value.kind(), &[], err.to_string()))?;
        Ok(out)
    }
}

/// JSON has no spelling for NaN or the infinities; a tree carrying one
/// (placed there through `encode_value`) cannot be printed.
fn check_finite(value: &Value, path: &CodingPath) -> Result<()> {
    match value {
        Value::Number(number) if !number.as_f64().is_finite() => Err(Error::invalid_value(
            number.to_string(),
            path,
            "Unable to encode a non-finite float as JSON.",
        )),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| check_finite(item, &path.appending(Key::Index(index)))),
        Value::Object(map) => map.iter().try_for_each(|(key, item)| {
            check_finite(item, &path.appending(Key::named(key.clone())))
        }),
        _ => Ok(()),
    }
}
