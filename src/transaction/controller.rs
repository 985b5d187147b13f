use super::relay::{RelayAction, Routed};
use crate::{
    store::{BoxedReducer, InitAction, LeafStore},
    tree::StoreTree,
};
use std::fmt;
use tracing::debug;

/// The action type of the top-level store.
pub enum ControlAction<S, A> {
    /// The top-level store's own initialization. Leaves the tree as it is.
    Init,
    /// Discards staged changes.
    Reset,
    /// Merges staged changes into the source tree.
    Commit,
    /// Forwards a routed action to the leaf store at its path.
    ReduceAtPath {
        store: LeafStore<S, A>,
        routed: Routed<S, A>,
    },
}

impl<S, A> InitAction for ControlAction<S, A> {
    fn init() -> Self {
        Self::Init
    }
}

/// The reducer of the top-level store, whose state is the [`StoreTree`].
///
/// Every transition mutates the tree in place and hands back the same handle, so the
/// top-level store's state never changes identity.
pub fn controller<S, A>(root: StoreTree<S, A>) -> BoxedReducer<StoreTree<S, A>, ControlAction<S, A>>
where
    S: Clone + PartialEq + 'static,
    A: Clone + 'static,
{
    Box::new(move |state, action| {
        let tree = state.unwrap_or(&root).clone();
        match action {
            ControlAction::Init => {}
            ControlAction::Reset => {
                tree.reset();
                debug!("reset staged tree");
            }
            ControlAction::Commit => {
                let changed = tree.staged_paths().len();
                tree.commit();
                debug!(changed, "committed staged tree");
            }
            ControlAction::ReduceAtPath { store, routed } => {
                store.dispatch(RelayAction::ReduceAtPath(routed.clone()));
            }
        }
        tree
    })
}

impl<S, A: fmt::Debug> fmt::Debug for ControlAction<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("Init"),
            Self::Reset => f.write_str("Reset"),
            Self::Commit => f.write_str("Commit"),
            Self::ReduceAtPath { routed, .. } => {
                f.debug_tuple("ReduceAtPath").field(routed).finish()
            }
        }
    }
}
