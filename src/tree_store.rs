// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The path-addressed facade over a built store tree.

use crate::{
    KeyPath, PathError, Schema, SchemaError, Subscription,
    builder::build,
    node::Node,
    schema::{Reducer, SchemaNode},
    store::{InitAction, LocalStoreFactory, NodeStore, StoreFactory},
    transaction::{ControlAction, Routed, controller, wrap},
    tree::{Cursor, Side, StoreTree},
};
use std::{fmt, rc::Rc};
use tracing::{debug, trace};

/// A tree of isolated reducer stores, addressed by [`KeyPath`].
///
/// Reads go to the source tree. Dispatches run the leaf reducer at a path and write its result to
/// the staged tree and, unless transaction mode is on, to the source tree as well. Staged changes
/// become visible to readers on [`TreeStore::commit`] and are dropped on [`TreeStore::reset`].
///
/// # Example
///
/// ```
/// use reducer_tree::{TreeStore, schema};
///
/// fn counter(state: Option<&i64>, action: &&str) -> i64 {
///     let state = state.copied().unwrap_or(0);
///     if *action == "INC" { state + 1 } else { state }
/// }
///
/// let mut store = TreeStore::new(schema! {
///     "a" => counter,
///     "b" => { "c" => counter }
/// })?;
/// assert_eq!(store.get_state("a")?, 0);
/// assert_eq!(store.get_state(["b", "c"])?, 0);
///
/// store.transaction(Some(true));
/// store.dispatch("a", "INC")?;
/// assert_eq!(store.get_state("a")?, 0);
/// store.commit();
/// assert_eq!(store.get_state("a")?, 1);
///
/// store.dispatch(["b", "c"], "INC")?;
/// store.reset();
/// assert_eq!(store.get_state(["b", "c"])?, 0);
/// # Ok::<(), reducer_tree::Error>(())
/// ```
pub struct TreeStore<S, A> {
    tree: StoreTree<S, A>,
    controller: Box<dyn NodeStore<StoreTree<S, A>, ControlAction<S, A>>>,
    in_transaction: bool,
}

/// Builds a [`TreeStore`] for `schema`, creating every store through `factory`.
///
/// Fails with [`SchemaError::NotATree`] if `schema` is a single reducer rather than a schema.
pub fn create_store<S, A, F>(
    schema: impl Into<SchemaNode<S, A>>,
    factory: &F,
) -> Result<TreeStore<S, A>, SchemaError>
where
    S: Clone + PartialEq + 'static,
    A: Clone + InitAction + 'static,
    F: StoreFactory,
{
    let schema: SchemaNode<S, A> = schema.into();
    let schema = Schema::try_from(schema)?;
    let tree = build(&schema, factory)?;
    let controller = factory.create_store(controller(tree.clone()), Some(tree.clone()));
    Ok(TreeStore {
        tree,
        controller,
        in_transaction: false,
    })
}

impl<S, A> TreeStore<S, A>
where
    S: Clone + PartialEq + 'static,
    A: Clone + InitAction + 'static,
{
    /// Builds a store for `schema` with plain in-memory stores.
    pub fn new(schema: impl Into<SchemaNode<S, A>>) -> Result<Self, SchemaError> {
        create_store(schema, &LocalStoreFactory)
    }

    pub fn with_factory<F: StoreFactory>(
        schema: impl Into<SchemaNode<S, A>>,
        factory: &F,
    ) -> Result<Self, SchemaError> {
        create_store(schema, factory)
    }

    /// The value at `path` in the source tree.
    pub fn get_state(&self, path: impl Into<KeyPath>) -> Result<S, PathError> {
        self.read(Side::Source, path.into())
    }

    /// The value at `path` in the staged tree, including changes not yet committed.
    pub fn staged_state(&self, path: impl Into<KeyPath>) -> Result<S, PathError> {
        self.read(Side::Staged, path.into())
    }

    fn read(&self, side: Side, path: KeyPath) -> Result<S, PathError> {
        let root = self.tree.root(side);
        let Some(node) = root.get_in(&path) else {
            return Err(PathError::NotFound { path });
        };
        node.value()
            .cloned()
            .ok_or(PathError::MissingValue { path })
    }

    /// Runs the reducer at `path` with `action` and returns `action`.
    ///
    /// The transaction flag is read now: in transaction mode the result only reaches the staged
    /// tree. Fails without touching either tree if there is no leaf at `path`.
    pub fn dispatch(&mut self, path: impl Into<KeyPath>, action: A) -> Result<A, PathError> {
        let path = path.into();
        let Some(node) = Node::lookup(&self.tree.root(Side::Source), &path) else {
            return Err(PathError::NotFound { path });
        };
        let Some(store) = node.store().cloned() else {
            return Err(PathError::NotALeaf { path });
        };

        trace!(%path, transaction = self.in_transaction, "dispatch");
        let routed = Routed {
            action: action.clone(),
            is_transaction: self.in_transaction,
            source: self.tree.cursor(Side::Source, &path).value(),
            staged: self.tree.cursor(Side::Staged, &path).value(),
        };
        self.controller
            .dispatch(ControlAction::ReduceAtPath { store, routed });
        Ok(action)
    }

    /// Runs `listener` whenever the source value at `path` changes.
    ///
    /// If the node at `path` has no value, for example because it is a branch or does not exist
    /// yet, the listener watches the whole node instead.
    pub fn subscribe(
        &self,
        path: impl Into<KeyPath>,
        listener: impl FnMut() + 'static,
    ) -> Subscription {
        self.observable(path).observe(listener)
    }

    /// A handle that can only register listeners on `path`.
    pub fn observable(&self, path: impl Into<KeyPath>) -> Observable<S, A> {
        Observable {
            cursor: self.tree.cursor(Side::Source, path),
        }
    }

    /// Swaps the reducer of the leaf at `path`. Its current state is kept.
    pub fn replace_reducer(
        &mut self,
        path: impl Into<KeyPath>,
        reducer: impl Fn(Option<&S>, &A) -> S + 'static,
    ) -> Result<(), PathError> {
        let path = path.into();
        let source = self.tree.cursor(Side::Source, &path);
        if !source.exists() {
            return Err(PathError::NotFound { path });
        }
        let Some(store) = source.store() else {
            return Err(PathError::NotALeaf { path });
        };

        let reducer: Reducer<S, A> = Rc::new(reducer);
        store.replace_reducer(wrap(Rc::clone(&reducer)));
        if let Some(staged) = self.tree.cursor(Side::Staged, &path).store()
            && staged != store
        {
            staged.replace_reducer(wrap(reducer));
        }
        debug!(%path, "replaced reducer");
        Ok(())
    }

    /// Discards all staged changes.
    pub fn reset(&mut self) {
        self.controller.dispatch(ControlAction::Reset);
    }

    /// Merges all staged changes into the source tree.
    pub fn commit(&mut self) {
        self.controller.dispatch(ControlAction::Commit);
    }

    /// Sets the transaction flag if `enable` is given, and returns the flag.
    pub fn transaction(&mut self, enable: Option<bool>) -> bool {
        if let Some(enable) = enable {
            self.in_transaction = enable;
        }
        self.in_transaction
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Runs `f` in transaction mode, then commits if it returned `Ok` and resets otherwise.
    ///
    /// The transaction flag is restored afterwards. Calls do not nest: the commit or reset at the
    /// end of an inner call applies to everything staged so far, including the outer call's
    /// changes.
    pub fn transact<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let previous = self.in_transaction;
        self.in_transaction = true;
        let result = f(self);
        match result {
            Ok(_) => self.commit(),
            Err(_) => self.reset(),
        }
        self.in_transaction = previous;
        result
    }

    /// A cursor at the root of the source tree, for reading and observing.
    pub fn get_tree(&self) -> Cursor<S, A> {
        self.tree.cursor(Side::Source, KeyPath::root())
    }

    /// A cursor at the root of the staged tree.
    pub fn staged_tree(&self) -> Cursor<S, A> {
        self.tree.cursor(Side::Staged, KeyPath::root())
    }

    pub fn has_staged_changes(&self) -> bool {
        self.tree.has_staged_changes()
    }
}

impl<S, A> TreeStore<S, A> {
    /// The underlying pair of trees.
    pub fn tree(&self) -> &StoreTree<S, A> {
        &self.tree
    }
}

#[cfg(feature = "json")]
impl<S, A> TreeStore<S, A>
where
    S: serde::Serialize,
{
    /// Renders one side of the tree as JSON. See [`Node::to_json`].
    pub fn to_json(&self, side: Side) -> Result<serde_json::Value, serde_json::Error> {
        self.tree.root(side).to_json()
    }
}

impl<S: fmt::Debug, A> fmt::Debug for TreeStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeStore")
            .field("tree", &self.tree)
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

/// Registers listeners on one path of a [`TreeStore`]. See [`TreeStore::subscribe`].
pub struct Observable<S, A> {
    cursor: Cursor<S, A>,
}

impl<S, A> Observable<S, A>
where
    S: 'static,
    A: 'static,
{
    pub fn observe(&self, listener: impl FnMut() + 'static) -> Subscription {
        let value = self.cursor.value();
        if value.exists() {
            value.observe(listener)
        } else {
            self.cursor.observe(listener)
        }
    }
}

impl<S, A> fmt::Debug for Observable<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable").field(self.cursor.path()).finish()
    }
}
