//! Error types for encoding and decoding.
//!
//! Every failure is a structured [`Error`] value: its variant says *why* the
//! conversion failed and its [`ErrorContext`] says *where*, as the
//! [`CodingPath`] from the root of the tree to the offending node.
//!
//! ## Error Kinds
//!
//! - **TypeMismatch**: the node has a different shape than the type expects
//! - **ValueNotFound**: the node is null (or an unkeyed container is at its end)
//!   but a non-optional value was requested
//! - **KeyNotFound**: a required key is absent from a keyed container
//! - **DataCorrupted**: the bytes could not be parsed, or a value failed a
//!   validity check of the type decoding it
//! - **InvalidValue**: an encode-side value that cannot be represented, such as
//!   a non-finite float under the throwing strategy
//! - **MissingUserInfo**: a type required a user option the context does not carry
//!
//! Conversions fail fast: the first error aborts the whole top-level call.
//!
//! ## Examples
//!
//! ```rust
//! use serde_codable::{codable, from_str, Error, Key};
//!
//! codable! {
//!     #[derive(Debug)]
//!     struct Nutrition {
//!         carbs: f64,
//!     }
//! }
//!
//! let err = from_str::<Nutrition>(r#"{"carbs": "lots"}"#).unwrap_err();
//! assert!(matches!(err, Error::TypeMismatch { .. }));
//! assert_eq!(err.coding_path().as_slice(), &[Key::fixed("carbs")]);
//! ```

use crate::{CodingPath, Key};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Where an error happened and what went wrong, in words.
#[derive(Clone, Debug, Default)]
pub struct ErrorContext {
    pub coding_path: CodingPath,
    pub debug_description: String,
    pub underlying: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ErrorContext {
    pub fn new(coding_path: impl Into<CodingPath>, debug_description: impl Into<String>) -> Self {
        ErrorContext {
            coding_path: coding_path.into(),
            debug_description: debug_description.into(),
            underlying: None,
        }
    }

    #[must_use]
    pub fn with_underlying<E>(mut self, underlying: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.underlying = Some(Arc::new(underlying));
        self
    }
}

/// Machine-inspectable discriminant of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeMismatch,
    ValueNotFound,
    KeyNotFound,
    DataCorrupted,
    InvalidValue,
    MissingUserInfo,
}

/// All errors raised while encoding or decoding.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The node at the path does not have the shape the type expects.
    #[error("Type mismatch at {}: expected {expected}. {}", .context.coding_path, .context.debug_description)]
    TypeMismatch {
        expected: String,
        context: ErrorContext,
    },

    /// A non-optional value was requested but the node is null or missing.
    #[error("Value not found at {}: expected {expected}. {}", .context.coding_path, .context.debug_description)]
    ValueNotFound {
        expected: String,
        context: ErrorContext,
    },

    /// A required key is absent. The path ends with the missing key.
    #[error("Key not found: `{key}` at {}. {}", .context.coding_path, .context.debug_description)]
    KeyNotFound { key: Key, context: ErrorContext },

    /// Malformed input, or a value rejected by the decoding type's own checks.
    #[error("Data corrupted at {}: {}", .context.coding_path, .context.debug_description)]
    DataCorrupted { context: ErrorContext },

    /// A value that cannot be represented in the tree.
    #[error("Invalid value {value} at {}: {}", .context.coding_path, .context.debug_description)]
    InvalidValue { value: String, context: ErrorContext },

    /// A user option required by a type is not present in the context.
    #[error("Missing user info `{key}` at {}: {}", .context.coding_path, .context.debug_description)]
    MissingUserInfo { key: String, context: ErrorContext },
}

impl Error {
    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_codable::{Error, Key};
    ///
    /// let err = Error::type_mismatch("f64", &[Key::fixed("carbs")], "Expected a number but found a string.");
    /// assert!(err.to_string().contains("expected f64"));
    /// ```
    pub fn type_mismatch(
        expected: impl Into<String>,
        path: &[Key],
        description: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            context: ErrorContext::new(path, description),
        }
    }

    pub fn value_not_found(
        expected: impl Into<String>,
        path: &[Key],
        description: impl Into<String>,
    ) -> Self {
        Error::ValueNotFound {
            expected: expected.into(),
            context: ErrorContext::new(path, description),
        }
    }

    /// Creates a key-not-found error. `path` is the path of the container the
    /// key was looked up in; the key itself is appended.
    pub fn key_not_found(key: Key, path: &[Key]) -> Self {
        let description = format!("No value associated with key `{}`.", key);
        let mut keys = path.to_vec();
        keys.push(key.clone());
        Error::KeyNotFound {
            key,
            context: ErrorContext::new(keys, description),
        }
    }

    /// Creates a data-corrupted error, for malformed input or for values that
    /// fail a type's own validity check.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_codable::{Error, ErrorKind, Key};
    ///
    /// let err = Error::data_corrupted(
    ///     &[Key::fixed("waterContent")],
    ///     "waterContent does not lie within the range of 0 - 100",
    /// );
    /// assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    /// ```
    pub fn data_corrupted(path: &[Key], description: impl Into<String>) -> Self {
        Error::DataCorrupted {
            context: ErrorContext::new(path, description),
        }
    }

    /// Creates a data-corrupted error carrying the error that caused it.
    pub fn data_corrupted_by<E>(path: &[Key], description: impl Into<String>, underlying: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::DataCorrupted {
            context: ErrorContext::new(path, description).with_underlying(underlying),
        }
    }

    pub fn invalid_value(
        value: impl Into<String>,
        path: &[Key],
        description: impl Into<String>,
    ) -> Self {
        Error::InvalidValue {
            value: value.into(),
            context: ErrorContext::new(path, description),
        }
    }

    pub fn missing_user_info(key: impl Into<String>, path: &[Key]) -> Self {
        let key = key.into();
        let description = format!("The context does not carry the user info `{}`.", key);
        Error::MissingUserInfo {
            key,
            context: ErrorContext::new(path, description),
        }
    }

    /// Creates a data-corrupted error at the root with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_codable::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::data_corrupted(&[], msg.to_string())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::ValueNotFound { .. } => ErrorKind::ValueNotFound,
            Error::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Error::DataCorrupted { .. } => ErrorKind::DataCorrupted,
            Error::InvalidValue { .. } => ErrorKind::InvalidValue,
            Error::MissingUserInfo { .. } => ErrorKind::MissingUserInfo,
        }
    }

    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        match self {
            Error::TypeMismatch { context, .. }
            | Error::ValueNotFound { context, .. }
            | Error::KeyNotFound { context, .. }
            | Error::DataCorrupted { context }
            | Error::InvalidValue { context, .. }
            | Error::MissingUserInfo { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Error::TypeMismatch { context, .. }
            | Error::ValueNotFound { context, .. }
            | Error::KeyNotFound { context, .. }
            | Error::DataCorrupted { context }
            | Error::InvalidValue { context, .. }
            | Error::MissingUserInfo { context, .. } => context,
        }
    }

    #[must_use]
    pub fn coding_path(&self) -> &CodingPath {
        &self.context().coding_path
    }

    #[must_use]
    pub fn debug_description(&self) -> &str {
        &self.context().debug_description
    }

    #[must_use]
    pub fn underlying(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.context().underlying.as_deref()
    }

    /// Attaches `path` to an error that was raised without one.
    ///
    /// Errors created through serde's error traits know nothing about the tree;
    /// the innermost bridge layer that sees them records its path here. A
    /// missing key is located below `path`. Errors that already carry a path
    /// are returned unchanged.
    pub(crate) fn located(mut self, path: &CodingPath) -> Self {
        if !self.coding_path().is_empty() {
            return self;
        }
        let located = match &self {
            Error::KeyNotFound { key, .. } => path.appending(key.clone()),
            _ => path.clone(),
        };
        self.context_mut().coding_path = located;
        self
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        let msg = msg.to_string();
        Error::invalid_value(msg.clone(), &[], msg)
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::data_corrupted(&[], msg.to_string())
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(
            exp.to_string(),
            &[],
            format!("Expected {} but found {} instead.", exp, unexp),
        )
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        Error::data_corrupted(&[], format!("Invalid length {}, expected {}.", len, exp))
    }

    fn missing_field(field: &'static str) -> Self {
        let key = Key::fixed(field);
        Error::KeyNotFound {
            context: ErrorContext::new(
                CodingPath::root(),
                format!("No value associated with key `{}`.", field),
            ),
            key,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
