//! Tree-wide strategies.
//!
//! Strategies are chosen once, when the [`Context`](crate::Context) is built,
//! and apply uniformly to every key and every leaf of their kind during one
//! top-level call:
//!
//! - [`KeyStrategy`]: rewrites key names (snake_case ↔ camelCase or custom)
//! - [`DateStrategy`]: how `chrono::DateTime<Utc>` leaves are represented
//! - [`NonFiniteFloatStrategy`]: what happens to infinities and NaN
//! - [`OutputFormatting`]: byte layout of the encoded output
//!
//! ## Examples
//!
//! ```rust
//! use serde_codable::{Context, DateStrategy, KeyStrategy, NonFiniteFloatStrategy, OutputFormatting};
//!
//! let context = Context::new()
//!     .with_key_encoding(KeyStrategy::SnakeToCamel)
//!     .with_date_strategy(DateStrategy::SecondsSince1970)
//!     .with_non_finite_floats(NonFiniteFloatStrategy::convert_to_string("+inf+", "-inf-", "NaN"))
//!     .with_output_formatting(OutputFormatting::pretty().with_sorted_keys(true));
//! ```

use crate::{Decoder, Encoder, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A user-supplied key mapping.
pub type KeyMapFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How key names are rewritten between a type and the tree.
///
/// When encoding, the strategy maps the type's key to the key written into the
/// tree. When decoding, a key is first looked up under the name the encoding
/// strategy writes for it, then under the tree keys converted by the decoding
/// strategy. A renamed `"imageURL"` therefore reads back as written, and
/// [`KeyStrategy::SnakeToCamel`] output is also read by matching
/// `horse_power` against `horsePower` converted by [`KeyStrategy::CamelToSnake`].
#[derive(Clone, Default)]
pub enum KeyStrategy {
    /// Keys are used exactly as written.
    #[default]
    Identity,
    /// `horse_power` becomes `horsePower`.
    SnakeToCamel,
    /// `horsePower` becomes `horse_power`; acronyms stay one word
    /// (`imageURLs` becomes `image_urls`).
    CamelToSnake,
    Custom(KeyMapFn),
}

impl KeyStrategy {
    pub fn custom<F>(map: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyStrategy::Custom(Arc::new(map))
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, KeyStrategy::Identity)
    }

    /// Applies the strategy to one key name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_codable::KeyStrategy;
    ///
    /// assert_eq!(KeyStrategy::SnakeToCamel.apply("is_delicious"), "isDelicious");
    /// assert_eq!(KeyStrategy::CamelToSnake.apply("imagesURLs"), "images_urls");
    /// assert_eq!(KeyStrategy::Identity.apply("as_is"), "as_is");
    /// ```
    #[must_use]
    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            KeyStrategy::Identity => Cow::Borrowed(name),
            KeyStrategy::SnakeToCamel => snake_to_camel(name),
            KeyStrategy::CamelToSnake => camel_to_snake(name),
            KeyStrategy::Custom(map) => Cow::Owned(map(name)),
        }
    }
}

impl fmt::Debug for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStrategy::Identity => f.write_str("Identity"),
            KeyStrategy::SnakeToCamel => f.write_str("SnakeToCamel"),
            KeyStrategy::CamelToSnake => f.write_str("CamelToSnake"),
            KeyStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Converts `snake_case` to `camelCase`.
///
/// Leading and trailing underscores are kept; a name without inner
/// underscores is returned unchanged.
pub fn snake_to_camel(name: &str) -> Cow<'_, str> {
    let Some(first) = name.find(|c| c != '_') else {
        return Cow::Borrowed(name);
    };
    let last = name.rfind(|c| c != '_').unwrap_or(first);
    let core = &name[first..=last];
    if !core.contains('_') {
        return Cow::Borrowed(name);
    }

    let mut converted = String::with_capacity(name.len());
    converted.push_str(&name[..first]);
    for (i, word) in core.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            converted.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            converted.extend(head.to_uppercase());
            converted.push_str(&chars.as_str().to_lowercase());
        }
    }
    converted.push_str(&name[last + 1..]);
    Cow::Owned(converted)
}

/// Converts `camelCase` to `snake_case`.
pub fn camel_to_snake(name: &str) -> Cow<'_, str> {
    if !name.chars().any(char::is_uppercase) {
        return Cow::Borrowed(name);
    }

    let chars: Vec<char> = name.chars().collect();
    let mut converted = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            let starts_word = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if starts_word && prev != '_' {
                converted.push('_');
            }
        }
        converted.extend(c.to_lowercase());
    }
    Cow::Owned(converted)
}

/// Writes a date through the encoder of the date's slot.
pub type DateEncodeFn = Arc<dyn Fn(&DateTime<Utc>, &mut Encoder<'_>) -> Result<()> + Send + Sync>;

/// Reads a date from the decoder of the date's slot.
pub type DateDecodeFn = Arc<dyn Fn(&Decoder<'_>) -> Result<DateTime<Utc>> + Send + Sync>;

/// How date leaves are represented in the tree.
#[derive(Clone, Default)]
pub enum DateStrategy {
    /// The date type's own serde representation: an RFC 3339 string with full
    /// sub-second precision.
    #[default]
    DeferredToDate,
    /// Floating-point seconds since 1970-01-01T00:00:00Z.
    SecondsSince1970,
    /// Floating-point milliseconds since 1970-01-01T00:00:00Z.
    MillisecondsSince1970,
    /// ISO 8601 / RFC 3339 text with whole seconds, e.g. `2018-04-03T19:46:52Z`.
    Iso8601,
    /// Text produced and parsed with a `chrono` format string such as
    /// `"%b-%d-%Y"`. Formats without a time of day decode to midnight UTC.
    Formatted(String),
    Custom {
        encode: DateEncodeFn,
        decode: DateDecodeFn,
    },
}

impl DateStrategy {
    pub fn formatted(format: impl Into<String>) -> Self {
        DateStrategy::Formatted(format.into())
    }

    pub fn custom<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&DateTime<Utc>, &mut Encoder<'_>) -> Result<()> + Send + Sync + 'static,
        D: Fn(&Decoder<'_>) -> Result<DateTime<Utc>> + Send + Sync + 'static,
    {
        DateStrategy::Custom {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }
}

impl fmt::Debug for DateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateStrategy::DeferredToDate => f.write_str("DeferredToDate"),
            DateStrategy::SecondsSince1970 => f.write_str("SecondsSince1970"),
            DateStrategy::MillisecondsSince1970 => f.write_str("MillisecondsSince1970"),
            DateStrategy::Iso8601 => f.write_str("Iso8601"),
            DateStrategy::Formatted(format) => f.debug_tuple("Formatted").field(format).finish(),
            DateStrategy::Custom { .. } => f.write_str("Custom { .. }"),
        }
    }
}

/// Converts fractional seconds since the epoch into a date.
pub(crate) fn date_from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0).round();
    // Rounding can carry into the next whole second.
    let (whole, nanos) = if nanos >= 1_000_000_000.0 {
        (whole + 1.0, 0.0)
    } else {
        (whole, nanos)
    };
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32)
}

pub(crate) fn seconds_from_date(date: &DateTime<Utc>) -> f64 {
    date.timestamp() as f64 + f64::from(date.timestamp_subsec_nanos()) / 1_000_000_000.0
}

/// Parses `text` with a `chrono` format string, accepting formats with an
/// offset, with a date and time, or with a date only.
pub(crate) fn parse_formatted_date(text: &str, format: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_str(text, format) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, format)
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// How infinities and NaN are represented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NonFiniteFloatStrategy {
    /// Encoding a non-finite float fails with [`Error::InvalidValue`](crate::Error::InvalidValue).
    #[default]
    Throw,
    /// Non-finite floats are written as these strings, and the same strings
    /// decode back into the matching non-finite value.
    ConvertToString {
        positive_infinity: String,
        negative_infinity: String,
        nan: String,
    },
}

impl NonFiniteFloatStrategy {
    pub fn convert_to_string(
        positive_infinity: impl Into<String>,
        negative_infinity: impl Into<String>,
        nan: impl Into<String>,
    ) -> Self {
        NonFiniteFloatStrategy::ConvertToString {
            positive_infinity: positive_infinity.into(),
            negative_infinity: negative_infinity.into(),
            nan: nan.into(),
        }
    }

    /// The sentinel string for a non-finite `value`, if this strategy has one.
    pub(crate) fn sentinel_for(&self, value: f64) -> Option<&str> {
        match self {
            NonFiniteFloatStrategy::Throw => None,
            NonFiniteFloatStrategy::ConvertToString {
                positive_infinity,
                negative_infinity,
                nan,
            } => {
                if value.is_nan() {
                    Some(nan)
                } else if value > 0.0 {
                    Some(positive_infinity)
                } else {
                    Some(negative_infinity)
                }
            }
        }
    }

    /// The non-finite value a sentinel string stands for.
    pub(crate) fn value_for(&self, text: &str) -> Option<f64> {
        match self {
            NonFiniteFloatStrategy::Throw => None,
            NonFiniteFloatStrategy::ConvertToString {
                positive_infinity,
                negative_infinity,
                nan,
            } => {
                if text == positive_infinity {
                    Some(f64::INFINITY)
                } else if text == negative_infinity {
                    Some(f64::NEG_INFINITY)
                } else if text == nan {
                    Some(f64::NAN)
                } else {
                    None
                }
            }
        }
    }
}

/// Byte layout of encoded output. Never changes the tree itself.
///
/// # Examples
///
/// ```rust
/// use serde_codable::OutputFormatting;
///
/// let compact = OutputFormatting::compact();
/// assert!(!compact.pretty);
///
/// let readable = OutputFormatting::pretty().with_indent(4).with_sorted_keys(true);
/// assert_eq!(readable.indent, 4);
/// assert!(readable.sorted_keys);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFormatting {
    pub pretty: bool,
    pub sorted_keys: bool,
    pub indent: usize,
}

impl Default for OutputFormatting {
    fn default() -> Self {
        OutputFormatting {
            pretty: false,
            sorted_keys: false,
            indent: 2,
        }
    }
}

impl OutputFormatting {
    #[must_use]
    pub fn compact() -> Self {
        Self::default()
    }

    /// Newlines and indentation for human readers.
    #[must_use]
    pub fn pretty() -> Self {
        OutputFormatting {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the number of spaces per nesting level. Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Writes the keys of every object in lexicographic order.
    #[must_use]
    pub fn with_sorted_keys(mut self, sorted_keys: bool) -> Self {
        self.sorted_keys = sorted_keys;
        self
    }
}
