use crate::{
    schema::Reducer,
    store::{BoxedReducer, InitAction},
    tree::ValueCursor,
};
use std::fmt;
use tracing::trace;

/// A leaf action together with where its result must be written.
///
/// The cursors are taken when the action is dispatched, so a reducer swapped in later still writes
/// to the slots that were current at dispatch time.
pub struct Routed<S, A> {
    pub action: A,
    /// Snapshot of the transaction flag at dispatch time.
    pub is_transaction: bool,
    /// The leaf's `VALUE` slot in the source tree.
    pub source: ValueCursor<S, A>,
    /// The leaf's `VALUE` slot in the staged tree.
    pub staged: ValueCursor<S, A>,
}

/// The action type of every leaf store.
pub enum RelayAction<S, A> {
    /// The store's own initialization. Passed to the leaf reducer as is.
    Init(A),
    /// A dispatch routed through the tree.
    ReduceAtPath(Routed<S, A>),
}

impl<S, A: InitAction> InitAction for RelayAction<S, A> {
    fn init() -> Self {
        Self::Init(A::init())
    }
}

impl<S, A> Routed<S, A>
where
    S: Clone + PartialEq,
{
    /// Writes a leaf reducer's result into the tree.
    ///
    /// The result always goes to the staged tree. It also goes to the source tree unless the action
    /// was dispatched in transaction mode.
    pub fn write(&self, next: S) {
        if self.is_transaction {
            trace!(path = %self.staged.path(), "staged write");
            self.staged.set(next);
        } else {
            trace!(path = %self.staged.path(), "write-through");
            self.staged.set_with(&self.source, next);
        }
    }
}

/// Wraps a leaf reducer so that it can run on routed actions.
///
/// The result becomes the leaf store's new local state. The leaf store then hands it to
/// [`Routed::write`] once the reducer has returned and the store is no longer borrowed.
pub fn wrap<S, A>(reducer: Reducer<S, A>) -> BoxedReducer<S, RelayAction<S, A>>
where
    S: 'static,
    A: 'static,
{
    Box::new(move |state, action| match action {
        RelayAction::Init(action) => reducer(state, action),
        RelayAction::ReduceAtPath(routed) => reducer(state, &routed.action),
    })
}

impl<S, A: Clone> Clone for Routed<S, A> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            is_transaction: self.is_transaction,
            source: self.source.clone(),
            staged: self.staged.clone(),
        }
    }
}

impl<S, A: Clone> Clone for RelayAction<S, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Init(action) => Self::Init(action.clone()),
            Self::ReduceAtPath(routed) => Self::ReduceAtPath(routed.clone()),
        }
    }
}

impl<S, A: fmt::Debug> fmt::Debug for Routed<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routed")
            .field("action", &self.action)
            .field("is_transaction", &self.is_transaction)
            .field("path", &self.source.path())
            .finish()
    }
}

impl<S, A: fmt::Debug> fmt::Debug for RelayAction<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(action) => f.debug_tuple("Init").field(action).finish(),
            Self::ReduceAtPath(routed) => f.debug_tuple("ReduceAtPath").field(routed).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        node::Node,
        tree::{Side, StoreTree},
    };
    use std::rc::Rc;

    fn adder() -> Reducer<i64, i64> {
        Rc::new(|state, action| state.copied().unwrap_or(0) + action)
    }

    fn routed(tree: &StoreTree<i64, i64>, action: i64, is_transaction: bool) -> Routed<i64, i64> {
        Routed {
            action,
            is_transaction,
            source: tree.cursor(Side::Source, "n").value(),
            staged: tree.cursor(Side::Staged, "n").value(),
        }
    }

    #[test]
    fn init_passes_through() {
        let reducer = wrap(adder());
        assert_eq!(reducer(None, &RelayAction::Init(5)), 5);
        assert_eq!(reducer(Some(&1), &RelayAction::Init(0)), 1);
    }

    #[test]
    fn routed_actions_reduce_the_inner_action() {
        let tree = StoreTree::from_source(Rc::new(Node::default()));
        let reducer = wrap(adder());
        let action = RelayAction::ReduceAtPath(routed(&tree, 2, false));
        assert_eq!(reducer(Some(&1), &action), 3);
        assert!(!tree.cursor(Side::Staged, "n").exists());
    }

    #[test]
    fn writes_respect_the_transaction_flag() {
        let tree = StoreTree::from_source(Rc::new(Node::default()));
        let value = |side| tree.cursor(side, "n").value().deref();

        routed(&tree, 2, false).write(3);
        assert_eq!(value(Side::Source), Some(3));
        assert_eq!(value(Side::Staged), Some(3));

        routed(&tree, 4, true).write(7);
        assert_eq!(value(Side::Source), Some(3));
        assert_eq!(value(Side::Staged), Some(7));
    }
}
