//! Per-call configuration.
//!
//! A [`Context`] is built once and shared, read-only, by every container of a
//! top-level encode or decode. It carries the [strategies](crate::strategy),
//! the output formatting, and a bag of user options ("user info") that custom
//! [`Encode`](crate::Encode)/[`Decode`](crate::Decode) impls can consult.
//!
//! ## Examples
//!
//! ```rust
//! use serde_codable::{Context, KeyStrategy, UserInfoKey};
//!
//! #[derive(Debug, PartialEq)]
//! enum ApiVersion { V1, V2 }
//!
//! const API_VERSION: UserInfoKey = UserInfoKey::new("api_version");
//!
//! let context = Context::new()
//!     .with_key_decoding(KeyStrategy::CamelToSnake)
//!     .with_user_info(API_VERSION, ApiVersion::V2);
//!
//! assert_eq!(context.user_info::<ApiVersion>(&API_VERSION), Some(&ApiVersion::V2));
//! ```

use crate::{DateStrategy, Error, Key, KeyStrategy, NonFiniteFloatStrategy, OutputFormatting, Result};
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Names one entry of a context's user info.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserInfoKey(Cow<'static, str>);

impl UserInfoKey {
    pub const fn new(name: &'static str) -> Self {
        UserInfoKey(Cow::Borrowed(name))
    }

    pub fn owned(name: impl Into<String>) -> Self {
        UserInfoKey(Cow::Owned(name.into()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserInfoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type UserInfo = HashMap<UserInfoKey, Arc<dyn Any + Send + Sync>>;

/// Strategies, output formatting and user options for one conversion.
///
/// `Context` is `Send + Sync`, so one context can serve many concurrent calls.
#[derive(Clone, Default)]
pub struct Context {
    /// Maps a type's key names to the names written into the tree.
    pub key_encoding: KeyStrategy,
    /// Maps the names found in the tree to the names matched against a type's keys.
    pub key_decoding: KeyStrategy,
    pub date_strategy: DateStrategy,
    pub non_finite_floats: NonFiniteFloatStrategy,
    pub output_formatting: OutputFormatting,
    /// Rejects tree keys that are not part of a typed key set.
    pub deny_unknown_keys: bool,
    user_info: UserInfo,
}

impl Context {
    /// Creates the default context: keys used as written, dates in their
    /// native representation, non-finite floats rejected, compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key strategy for both directions so that output written with
    /// this context reads back with it. `SnakeToCamel` encodes with
    /// `SnakeToCamel` and decodes with `CamelToSnake`, and vice versa.
    /// A custom mapping cannot be inverted: it is used for encoding only, and
    /// decoding finds each key under the name the mapping writes for it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_codable::{Context, KeyStrategy};
    ///
    /// let context = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);
    /// assert!(matches!(context.key_decoding, KeyStrategy::CamelToSnake));
    /// ```
    #[must_use]
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_decoding = match &strategy {
            KeyStrategy::SnakeToCamel => KeyStrategy::CamelToSnake,
            KeyStrategy::CamelToSnake => KeyStrategy::SnakeToCamel,
            KeyStrategy::Identity | KeyStrategy::Custom(_) => KeyStrategy::Identity,
        };
        self.key_encoding = strategy;
        self
    }

    #[must_use]
    pub fn with_key_encoding(mut self, strategy: KeyStrategy) -> Self {
        self.key_encoding = strategy;
        self
    }

    #[must_use]
    pub fn with_key_decoding(mut self, strategy: KeyStrategy) -> Self {
        self.key_decoding = strategy;
        self
    }

    #[must_use]
    pub fn with_date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_non_finite_floats(mut self, strategy: NonFiniteFloatStrategy) -> Self {
        self.non_finite_floats = strategy;
        self
    }

    #[must_use]
    pub fn with_output_formatting(mut self, formatting: OutputFormatting) -> Self {
        self.output_formatting = formatting;
        self
    }

    #[must_use]
    pub fn with_deny_unknown_keys(mut self, deny: bool) -> Self {
        self.deny_unknown_keys = deny;
        self
    }

    /// Adds a user option. A later value for the same key replaces the earlier one.
    #[must_use]
    pub fn with_user_info<T>(mut self, key: UserInfoKey, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.user_info.insert(key, Arc::new(value));
        self
    }

    /// Returns the user option stored under `key`, if it exists and has type `T`.
    #[must_use]
    pub fn user_info<T: Any>(&self, key: &UserInfoKey) -> Option<&T> {
        self.user_info.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Like [`Context::user_info`], but fails with
    /// [`Error::MissingUserInfo`] at `path` when the option is not supplied.
    pub fn require_user_info<T: Any>(&self, key: &UserInfoKey, path: &[Key]) -> Result<&T> {
        self.user_info::<T>(key)
            .ok_or_else(|| Error::missing_user_info(key.name(), path))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut user_info: Vec<&str> = self.user_info.keys().map(UserInfoKey::name).collect();
        user_info.sort_unstable();
        f.debug_struct("Context")
            .field("key_encoding", &self.key_encoding)
            .field("key_decoding", &self.key_decoding)
            .field("date_strategy", &self.date_strategy)
            .field("non_finite_floats", &self.non_finite_floats)
            .field("output_formatting", &self.output_formatting)
            .field("deny_unknown_keys", &self.deny_unknown_keys)
            .field("user_info", &user_info)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION: UserInfoKey = UserInfoKey::new("version");

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Context>();
    }

    #[test]
    fn test_user_info_lookup_is_typed() {
        let context = Context::new().with_user_info(VERSION, 2u8);
        assert_eq!(context.user_info::<u8>(&VERSION), Some(&2));
        assert_eq!(context.user_info::<u16>(&VERSION), None);
        assert_eq!(context.user_info::<u8>(&UserInfoKey::owned("other")), None);
    }

    #[test]
    fn test_require_user_info_signals_absence() {
        let path = [Key::fixed("retailer")];
        let err = Context::new()
            .require_user_info::<u8>(&VERSION, &path)
            .unwrap_err();
        assert!(matches!(err, Error::MissingUserInfo { ref key, .. } if key == "version"));
        assert_eq!(err.coding_path().as_slice(), &path);
    }

    #[test]
    fn test_builder_sets_fields() {
        let context = Context::new()
            .with_deny_unknown_keys(true)
            .with_output_formatting(OutputFormatting::pretty());
        assert!(context.deny_unknown_keys);
        assert!(context.output_formatting.pretty);
        assert!(context.key_encoding.is_identity());
        assert!(format!("{:?}", context).contains("deny_unknown_keys: true"));
    }
}
