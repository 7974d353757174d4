//! Keys and coding paths.
//!
//! A [`CodingKey`] names one field of a keyed container or one position of an
//! unkeyed container. Types usually declare their key set with
//! [`coding_keys!`](crate::coding_keys); data whose field names are only known
//! at runtime uses the dynamic [`Key`] directly.
//!
//! A [`CodingPath`] is the ordered list of keys from the root of the tree to the
//! node a container is bound to. It grows by one key per nesting step and is
//! copied verbatim into every [`Error`](crate::Error).

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// Identifies a field (by name) or an element (by position).
///
/// Implemented by the key enums generated with
/// [`coding_keys!`](crate::coding_keys) and by the dynamic [`Key`].
pub trait CodingKey: Sized {
    /// The key's name as written by the type, before any key strategy runs.
    fn name(&self) -> Cow<'_, str>;

    /// The key's position, for keys that address array elements.
    fn index(&self) -> Option<usize> {
        None
    }

    /// Builds a key from a name found in the tree. Returns `None` when the
    /// name is not part of this key set.
    fn from_name(name: &str) -> Option<Self>;

    fn from_index(_index: usize) -> Option<Self> {
        None
    }

    /// Every name of a closed key set. Open key sets, such as the dynamic
    /// [`Key`], return an empty slice.
    fn declared_names() -> &'static [&'static str] {
        &[]
    }

    /// Whether the context's key strategy rewrites this key. Keys that already
    /// match the tree exactly return `false`.
    fn uses_key_strategy(&self) -> bool {
        true
    }

    /// Converts this key into the path element recorded in [`CodingPath`].
    fn to_key(&self) -> Key {
        match self.index() {
            Some(index) => Key::Index(index),
            None => Key::Named(Cow::Owned(self.name().into_owned())),
        }
    }
}

/// A dynamic key, and the element type of every [`CodingPath`].
///
/// Two keys are equal exactly when their payloads are equal.
///
/// # Examples
///
/// ```rust
/// use serde_codable::{CodingKey, Key};
///
/// let role = Key::named("guitarist".to_string());
/// assert_eq!(role, Key::fixed("guitarist"));
/// assert_eq!(role.name(), "guitarist");
/// assert_eq!(Key::index(2).index(), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Named(Cow<'static, str>),
    Index(usize),
}

impl Key {
    /// Name of the key used by [`super_encoder`](crate::KeyedEncodingContainer::super_encoder)
    /// and [`super_decoder`](crate::KeyedDecodingContainer::super_decoder).
    pub const SUPER: Key = Key::fixed("super");

    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Key::Named(name.into())
    }

    /// Builds a named key from a string literal without allocating.
    pub const fn fixed(name: &'static str) -> Self {
        Key::Named(Cow::Borrowed(name))
    }

    pub const fn index(index: usize) -> Self {
        Key::Index(index)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Named(name) => Some(name),
            Key::Index(_) => None,
        }
    }
}

impl CodingKey for Key {
    fn name(&self) -> Cow<'_, str> {
        match self {
            Key::Named(name) => Cow::Borrowed(name),
            Key::Index(index) => Cow::Owned(format!("Index {}", index)),
        }
    }

    fn index(&self) -> Option<usize> {
        match self {
            Key::Named(_) => None,
            Key::Index(index) => Some(*index),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(Key::Named(Cow::Owned(name.to_string())))
    }

    fn from_index(index: usize) -> Option<Self> {
        Some(Key::Index(index))
    }

    fn to_key(&self) -> Key {
        self.clone()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Named(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Key::fixed(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Named(Cow::Owned(name))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// The fixed set of field names of a type, as written in the tree before any
/// key strategy runs. Implemented by [`codable!`](crate::codable).
pub trait Fields {
    const FIELDS: &'static [&'static str];
}

/// A key restricted to the field names of `T`.
///
/// This is the key type of the impls generated by
/// [`codable!`](crate::codable); names outside `T::FIELDS` are unknown keys.
pub struct FieldKey<T> {
    name: &'static str,
    owner: PhantomData<fn() -> T>,
}

impl<T> FieldKey<T> {
    pub const fn new(name: &'static str) -> Self {
        FieldKey {
            name,
            owner: PhantomData,
        }
    }
}

impl<T> Clone for FieldKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldKey<T> {}

impl<T> fmt::Debug for FieldKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldKey").field(&self.name).finish()
    }
}

impl<T: Fields> CodingKey for FieldKey<T> {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name)
    }

    fn from_name(name: &str) -> Option<Self> {
        T::FIELDS
            .iter()
            .copied()
            .find(|field| *field == name)
            .map(FieldKey::new)
    }

    fn declared_names() -> &'static [&'static str] {
        T::FIELDS
    }

    fn to_key(&self) -> Key {
        Key::fixed(self.name)
    }
}

/// The keys leading from the root of the tree to the current node.
///
/// Dereferences to `[Key]`; consumers can read it but never modify it.
///
/// # Examples
///
/// ```rust
/// use serde_codable::{CodingPath, Key};
///
/// let path = CodingPath::from(vec![Key::fixed("availability"), Key::index(1), Key::fixed("name")]);
/// assert_eq!(path.to_string(), "availability[1].name");
/// assert_eq!(path.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CodingPath(Vec<Key>);

impl CodingPath {
    /// The empty path of the root node.
    #[must_use]
    pub const fn root() -> Self {
        CodingPath(Vec::new())
    }

    /// Returns a copy of this path with `key` appended.
    #[must_use]
    pub fn appending(&self, key: Key) -> Self {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key);
        CodingPath(keys)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Key] {
        &self.0
    }

    #[must_use]
    pub fn into_keys(self) -> Vec<Key> {
        self.0
    }
}

impl Deref for CodingPath {
    type Target = [Key];

    fn deref(&self) -> &[Key] {
        &self.0
    }
}

impl From<Vec<Key>> for CodingPath {
    fn from(keys: Vec<Key>) -> Self {
        CodingPath(keys)
    }
}

impl From<&[Key]> for CodingPath {
    fn from(keys: &[Key]) -> Self {
        CodingPath(keys.to_vec())
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            match key {
                Key::Index(index) => write!(f, "[{}]", index)?,
                Key::Named(name) if i == 0 => f.write_str(name)?,
                Key::Named(name) => write!(f, ".{}", name)?,
            }
        }
        Ok(())
    }
}
