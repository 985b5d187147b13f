// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Schema descriptors: which reducer lives at which path.
//!
//! A [`Schema`] is an ordered list of keyed entries, each either a reducer ([`SchemaNode::Leaf`]) or
//! a nested schema ([`SchemaNode::Tree`]). Only a `Schema` can be built into a store tree, so the
//! root is always composable; a bare reducer is rejected with [`SchemaError::NotATree`] when it is
//! converted.
//!
//! Schemas can be written out with the builder methods, with [`tree`] from a list of entries, or
//! with the [`schema!`](crate::schema!) literal:
//!
//! ```
//! use reducer_tree::{Schema, SchemaNode, schema, tree};
//!
//! fn counter(state: Option<&i64>, action: &&str) -> i64 {
//!     let state = state.copied().unwrap_or(0);
//!     if *action == "INC" { state + 1 } else { state }
//! }
//!
//! let built = Schema::new()
//!     .leaf("a", counter)
//!     .subtree("b", Schema::new().leaf("c", counter));
//! let listed = tree([
//!     ("a", SchemaNode::leaf(counter)),
//!     ("b", tree([("c", SchemaNode::leaf(counter))]).into()),
//! ]);
//! let literal: Schema<i64, &str> = schema! {
//!     "a" => counter,
//!     "b" => { "c" => counter }
//! };
//!
//! for schema in [built, listed, literal] {
//!     assert_eq!(schema.leaf_paths().iter().map(|p| p.to_string()).collect::<Vec<_>>(), ["a", "b.c"]);
//! }
//! ```

use crate::{Key, KeyPath, SchemaError};
use std::{fmt, rc::Rc};

/// A shared reducer: the next state from the current one (if any) and an action.
pub type Reducer<S, A> = Rc<dyn Fn(Option<&S>, &A) -> S>;

/// One entry of a schema.
pub enum SchemaNode<S, A> {
    Leaf(Reducer<S, A>),
    Tree(Schema<S, A>),
}

impl<S, A> SchemaNode<S, A> {
    pub fn leaf(reducer: impl Fn(Option<&S>, &A) -> S + 'static) -> Self {
        Self::Leaf(Rc::new(reducer))
    }
}

impl<S, A> From<Schema<S, A>> for SchemaNode<S, A> {
    fn from(schema: Schema<S, A>) -> Self {
        Self::Tree(schema)
    }
}

/// A composable schema, the only thing a store tree can be built from.
pub struct Schema<S, A> {
    entries: Vec<(Key, SchemaNode<S, A>)>,
}

impl<S, A> Schema<S, A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a reducer under `key`.
    #[must_use]
    pub fn leaf(
        mut self,
        key: impl Into<Key>,
        reducer: impl Fn(Option<&S>, &A) -> S + 'static,
    ) -> Self {
        self.entries.push((key.into(), SchemaNode::leaf(reducer)));
        self
    }

    /// Adds a nested schema under `key`.
    #[must_use]
    pub fn subtree(mut self, key: impl Into<Key>, schema: Schema<S, A>) -> Self {
        self.entries.push((key.into(), SchemaNode::Tree(schema)));
        self
    }

    /// Places `reducer` at `path`, creating nested schemas along the way.
    ///
    /// An existing entry at `path` is replaced. Fails if `path` is empty or passes through a
    /// reducer.
    pub fn insert(
        &mut self,
        path: impl Into<KeyPath>,
        reducer: impl Fn(Option<&S>, &A) -> S + 'static,
    ) -> Result<(), SchemaError> {
        let path = path.into();
        let Some((last, parents)) = path.split_last() else {
            return Err(SchemaError::EmptyPath);
        };

        let mut schema = self;
        for (depth, key) in parents.iter().enumerate() {
            let index = match schema.position(key) {
                Some(index) => index,
                None => {
                    schema.entries.push((key.clone(), SchemaNode::Tree(Schema::new())));
                    schema.entries.len() - 1
                }
            };
            schema = match &mut schema.entries[index].1 {
                SchemaNode::Tree(child) => child,
                SchemaNode::Leaf(_) => {
                    return Err(SchemaError::LeafInPath {
                        path: path[..=depth].iter().cloned().collect(),
                    });
                }
            };
        }

        let node = SchemaNode::leaf(reducer);
        match schema.position(last) {
            Some(index) => schema.entries[index].1 = node,
            None => schema.entries.push((last.clone(), node)),
        }
        Ok(())
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// The entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&Key, &SchemaNode<S, A>)> {
        self.entries.iter().map(|(key, node)| (key, node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The paths of all reducers, depth first in declaration order.
    pub fn leaf_paths(&self) -> Vec<KeyPath> {
        let mut out = Vec::new();
        self.collect_leaf_paths(&KeyPath::root(), &mut out);
        out
    }

    fn collect_leaf_paths(&self, prefix: &KeyPath, out: &mut Vec<KeyPath>) {
        for (key, node) in &self.entries {
            let path = prefix.child(key.clone());
            match node {
                SchemaNode::Leaf(_) => out.push(path),
                SchemaNode::Tree(schema) => schema.collect_leaf_paths(&path, out),
            }
        }
    }
}

/// Builds a schema from `(key, node)` pairs.
pub fn tree<S, A, K>(entries: impl IntoIterator<Item = (K, SchemaNode<S, A>)>) -> Schema<S, A>
where
    K: Into<Key>,
{
    Schema {
        entries: entries
            .into_iter()
            .map(|(key, node)| (key.into(), node))
            .collect(),
    }
}

impl<S, A> TryFrom<SchemaNode<S, A>> for Schema<S, A> {
    type Error = SchemaError;

    fn try_from(node: SchemaNode<S, A>) -> Result<Self, Self::Error> {
        match node {
            SchemaNode::Tree(schema) => Ok(schema),
            SchemaNode::Leaf(_) => Err(SchemaError::NotATree),
        }
    }
}

impl<S, A> Default for Schema<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Clone for Schema<S, A> {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(key, node)| (key.clone(), node.clone()))
                .collect(),
        }
    }
}

impl<S, A> Clone for SchemaNode<S, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(reducer) => Self::Leaf(Rc::clone(reducer)),
            Self::Tree(schema) => Self::Tree(schema.clone()),
        }
    }
}

impl<S, A> fmt::Debug for SchemaNode<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("<reducer>"),
            Self::Tree(schema) => schema.fmt(f),
        }
    }
}

impl<S, A> fmt::Debug for Schema<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.to_string(), v)))
            .finish()
    }
}
