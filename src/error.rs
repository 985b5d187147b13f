// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Errors raised while building a tree or addressing its nodes.
//!
//! All errors are programmer errors: a malformed schema or a path that the built tree does not
//! answer to. They are raised synchronously by the call that detects them and leave the tree as it
//! was before the call.

use crate::KeyPath;
use thiserror::Error;

/// A malformed schema descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The root of a store tree must be a schema, not a single reducer.
    #[error("not a reducer tree: the root must be a schema, found a reducer")]
    NotATree,

    /// The same key was declared twice within one schema level.
    #[error("duplicate key in schema at path {path}")]
    DuplicateKey { path: KeyPath },

    /// A nested insert tried to descend through a reducer.
    #[error("expected a schema at path {path}, found a reducer")]
    LeafInPath { path: KeyPath },

    /// Reducers cannot be placed at the root path.
    #[error("cannot insert a reducer at the root path")]
    EmptyPath,
}

/// An operation addressed a node the tree does not have, or a node lacking the required slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No node exists at the path.
    #[error("invalid path: no node at {path}")]
    NotFound { path: KeyPath },

    /// The node exists but holds no value (for example, an internal node).
    #[error("invalid path: no value at {path}")]
    MissingValue { path: KeyPath },

    /// The node exists but has no store to dispatch to.
    #[error("invalid path: no reducer store at {path}")]
    NotALeaf { path: KeyPath },
}

impl PathError {
    /// The path the failing operation addressed.
    pub fn path(&self) -> &KeyPath {
        match self {
            PathError::NotFound { path }
            | PathError::MissingValue { path }
            | PathError::NotALeaf { path } => path,
        }
    }
}

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Path(#[from] PathError),
}
