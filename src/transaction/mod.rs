//! Routing of actions through the store tree.
//!
//! Two reducers cooperate to turn a path-addressed dispatch into tree writes:
//!
//! - the **relay** ([`wrap`]) sits in front of every leaf reducer. It runs the leaf reducer on the
//!   routed action, and the leaf store writes the result through the cursors in [`Routed`] once
//!   the reducer has returned;
//! - the **controller** ([`controller`]) is the reducer of the one top-level store. Its state is
//!   the [`StoreTree`](crate::StoreTree), and it serializes the three transitions that touch it.
//!
//! | Action | Effect |
//! |--------|--------|
//! | [`ControlAction::Reset`] | staged tree := source tree |
//! | [`ControlAction::Commit`] | both trees := deep merge of staged into source |
//! | [`ControlAction::ReduceAtPath`] | leaf store dispatches [`RelayAction::ReduceAtPath`] |
//!
//! # Transaction mode
//!
//! Whether a dispatch writes through to the source tree is decided when it is issued. The facade
//! snapshots its transaction flag into [`Routed::is_transaction`] together with cursors at the
//! leaf's `VALUE` slot on both sides. Toggling the flag later does not affect actions that were
//! already routed.
//!
//! ```
//! use reducer_tree::{Schema, TreeStore};
//!
//! let schema = Schema::new().leaf("hits", |state: Option<&u32>, action: &Option<u32>| {
//!     state.copied().unwrap_or(0) + action.unwrap_or(0)
//! });
//! let mut store = TreeStore::new(schema)?;
//!
//! store.transaction(Some(true));
//! store.dispatch("hits", Some(2))?;
//! assert_eq!(store.get_state("hits")?, 0);
//! assert_eq!(store.staged_state("hits")?, 2);
//!
//! store.commit();
//! assert_eq!(store.get_state("hits")?, 2);
//! # Ok::<(), reducer_tree::Error>(())
//! ```

mod controller;
mod relay;

pub use controller::{ControlAction, controller};
pub use relay::{RelayAction, Routed, wrap};
