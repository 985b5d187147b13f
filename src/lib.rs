// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # reducer-tree: Isolated Reducers Composed into One Transactional State Tree
//!
//! This crate composes many small, independent reducer stores into a single state tree that is
//! addressed by key path. Every reducer in a [`Schema`] gets its own store; the tree mirrors the
//! schema's shape and holds each store's current state at the store's path. A single
//! [`TreeStore`] fronts the whole thing: callers read and dispatch by path, and the tree routes
//! each action to the one reducer responsible for it.
//!
//! On top of the routing, the tree supports **staged changes**. It keeps two persistent trees over
//! the same paths:
//!
//! - the **source tree**, the authoritative state every reader sees, and
//! - the **staged tree**, a working copy that can run ahead of the source.
//!
//! With transaction mode off, a dispatch writes through to both trees. With it on, the result only
//! lands in the staged tree until [`TreeStore::commit`] merges it into the source tree, or
//! [`TreeStore::reset`] throws it away.
//!
//! ## Core Concepts
//!
//! - [`Schema`]: which reducer lives at which path. Nested schemas produce nested paths. The root
//!   of a tree must always be a schema; a lone reducer is not a tree.
//! - [`KeyPath`]: a sequence of [`Key`]s, either names or indices. It is the only way to address a
//!   node.
//! - [`Node`]: one node of a persistent tree. Updates copy only the nodes along the updated path,
//!   so forking the staged tree from the source tree costs nothing.
//! - [`StoreTree`]: the single mutable cell holding both roots. All mutations go through it and
//!   happen as one atomic transition each.
//! - [`Cursor`] and [`ValueCursor`]: cheap views of one path on one [`Side`] of the tree. They can
//!   read, write and observe, but never own the tree.
//!
//! ## Example
//!
//! ```
//! use reducer_tree::{TreeStore, schema};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Action {
//!     Init,
//!     Inc,
//! }
//!
//! impl reducer_tree::store::InitAction for Action {
//!     fn init() -> Self {
//!         Action::Init
//!     }
//! }
//!
//! fn counter(state: Option<&i64>, action: &Action) -> i64 {
//!     let state = state.copied().unwrap_or(0);
//!     match action {
//!         Action::Inc => state + 1,
//!         Action::Init => state,
//!     }
//! }
//!
//! let mut store = TreeStore::new(schema! {
//!     "a" => counter,
//!     "b" => { "c" => counter }
//! })?;
//!
//! // Staged: readers still see the old value.
//! store.transaction(Some(true));
//! store.dispatch("a", Action::Inc)?;
//! assert_eq!(store.get_state("a")?, 0);
//! assert_eq!(store.staged_state("a")?, 1);
//!
//! // Written through: visible at once, even while another change is staged.
//! store.transaction(Some(false));
//! store.dispatch(["b", "c"], Action::Inc)?;
//! assert_eq!(store.get_state(["b", "c"])?, 1);
//!
//! // Committing keeps both.
//! store.commit();
//! assert_eq!(store.get_state("a")?, 1);
//! assert_eq!(store.get_state(["b", "c"])?, 1);
//! assert!(!store.has_staged_changes());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Commit Semantics
//!
//! A commit does not replace the source tree with the staged tree. It deep-merges the staged tree
//! into the source tree: wherever both hold a value, the staged value wins, and everything the
//! staged tree does not hold is kept from the source tree. This matters when transaction mode is
//! toggled while changes are staged. A dispatch issued with transaction mode off writes to both
//! trees, so the merge keeps it even though an older copy of the staged tree was forked before
//! it.
//!
//! Committing twice in a row, or resetting twice in a row, changes nothing the second time.
//!
//! ## Leaf Stores
//!
//! Each reducer runs inside its own store, created through a [`StoreFactory`](store::StoreFactory).
//! The store's local state is what the reducer sees as its current state on the next dispatch.
//! Resetting the staged tree does not rewind a leaf store's local state.
//!
//! The top-level controller is itself just another store, whose state is the [`StoreTree`]. This
//! serializes every reset, commit and routed dispatch into one update each.
//!
//! ## Observation
//!
//! [`TreeStore::subscribe`] registers a listener on the source value at a path, or on the whole
//! node when there is no value there. Listeners only run when what they watch actually changes,
//! and they run after the transition completes, so they may read the tree.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events. Builds, resets and commits log at `debug`; per-leaf store
//! creation, dispatches and tree writes log at `trace`.
//!
//! ## License
//!
//! This project is licensed under either of
//!
//! - Apache License, Version 2.0, ([LICENSE-APACHE](LICENSE-APACHE) or http://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or http://opensource.org/licenses/MIT)
//!
//! at your option.
//!
//! ## Features
//!
//! - `json`: Renders trees as `serde_json::Value` and lets `serde_json::Value` be used as an
//!   action type. This feature is enabled by default.
//! - `serde`: Provides `serde` support for [`Key`] and [`KeyPath`].
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod builder;
mod error;
#[cfg(feature = "json")]
mod json;
/// Macros usable for tests and initialization
pub mod macros;
mod node;
mod path;
mod schema;
pub mod store;
mod subscription;
#[cfg(test)]
mod test_util;
/// Routing of leaf actions and the top-level controller.
///
/// See [`transaction`] module documentation for details and examples.
pub mod transaction;
mod tree;
mod tree_store;

pub use builder::build;
pub use error::{Error, PathError, SchemaError};
pub use node::Node;
pub use path::{Key, KeyPath};
pub use schema::{Reducer, Schema, SchemaNode, tree};
pub use subscription::Subscription;
pub use tree::{Cursor, Side, StoreTree, ValueCursor};
pub use tree_store::{Observable, TreeStore, create_store};
