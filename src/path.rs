// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Key paths for addressing nodes in a store tree.
//!
//! A [`KeyPath`] is an ordered sequence of [`Key`]s. It is the only way callers address a node,
//! both when reading state and when dispatching actions. The set of paths a tree answers to is
//! fixed when the tree is built.

use smallvec::SmallVec;
use std::{fmt, ops::Deref};

/// A single segment of a [`KeyPath`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Key {
    /// A named child, as in `{"name": ...}`.
    Name(String),
    /// A positional child, as in `[index]`.
    Index(usize),
}

impl Key {
    /// Returns the name if this is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Index(_) => None,
        }
    }

    /// Returns the index if this is a positional key.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Name(_) => None,
            Key::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// An ordered sequence of [`Key`]s identifying a node.
///
/// The empty path addresses the root of a tree.
///
/// ```
/// use reducer_tree::{Key, KeyPath};
///
/// let path = KeyPath::from(["todos", "items"]).child(3usize);
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.last(), Some(&Key::Index(3)));
/// assert_eq!(path.to_string(), "todos.items[3]");
/// ```
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct KeyPath(SmallVec<[Key; 4]>);

impl KeyPath {
    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Appends a key to this path.
    pub fn push(&mut self, key: impl Into<Key>) {
        self.0.push(key.into());
    }

    /// Returns a new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: impl Into<Key>) -> Self {
        let mut child = self.clone();
        child.push(key);
        child
    }

    /// Returns the path without its last key, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(parent.iter().cloned().collect())
    }

    /// Returns true if `prefix` addresses this node or one of its ancestors.
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for KeyPath {
    type Target = [Key];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            match key {
                Key::Name(name) if i > 0 => write!(f, ".{name}")?,
                key => write!(f, "{key}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPath({self})")
    }
}

impl<K: Into<Key>> FromIterator<K> for KeyPath {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Key>, const N: usize> From<[K; N]> for KeyPath {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<K: Into<Key>> From<Vec<K>> for KeyPath {
    fn from(keys: Vec<K>) -> Self {
        keys.into_iter().collect()
    }
}

impl<K: Into<Key> + Clone> From<&[K]> for KeyPath {
    fn from(keys: &[K]) -> Self {
        keys.iter().cloned().collect()
    }
}

impl From<&str> for KeyPath {
    fn from(name: &str) -> Self {
        Self(smallvec::smallvec![Key::from(name)])
    }
}

impl From<Key> for KeyPath {
    fn from(key: Key) -> Self {
        Self(smallvec::smallvec![key])
    }
}

impl From<&KeyPath> for KeyPath {
    fn from(path: &KeyPath) -> Self {
        path.clone()
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
