// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The single-node reducer store.
//!
//! A node store holds one piece of state and a reducer to advance it. It is the building block the
//! tree composes: every schema leaf gets its own isolated store, and the whole tree is driven by
//! one more store whose state is the [`StoreTree`](crate::StoreTree) itself.
//!
//! Stores are created through a [`StoreFactory`], which lets callers substitute their own
//! [`NodeStore`] implementation (for example, to instrument dispatches). [`LocalStoreFactory`]
//! creates the plain [`Store`] shipped with this crate.

mod leaf;
mod local;

pub use leaf::LeafStore;
pub use local::Store;

/// A reducer as held by a store: the next state from the current one and an action.
///
/// The state is `None` only while a store computes its initial state without a preloaded value.
pub type BoxedReducer<S, X> = Box<dyn Fn(Option<&S>, &X) -> S>;

/// Actions that can seed a store.
///
/// When a store is created it dispatches [`InitAction::init`] once, so that each reducer can
/// produce its initial state. Reducers are expected to treat it like any action they do not
/// recognise and return their default state.
pub trait InitAction {
    fn init() -> Self;
}

/// The action type used in string-typed stores when they initialise.
pub const INIT_ACTION_TYPE: &str = "@@reducer-tree/INIT";

impl InitAction for () {
    fn init() -> Self {}
}

impl<T> InitAction for Option<T> {
    fn init() -> Self {
        None
    }
}

impl InitAction for String {
    fn init() -> Self {
        INIT_ACTION_TYPE.to_owned()
    }
}

impl InitAction for &'static str {
    fn init() -> Self {
        INIT_ACTION_TYPE
    }
}

/// Identifies a listener registered with [`NodeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A reducer-driven state holder.
///
/// Dispatch runs to completion before returning. Implementations must apply the reducer exactly
/// once per dispatch and notify listeners afterwards.
pub trait NodeStore<S, X> {
    /// The current state.
    fn state(&self) -> &S;

    /// Applies `action` to the current state and returns the action.
    fn dispatch(&mut self, action: X) -> X;

    /// Registers a listener that runs after every dispatch.
    fn subscribe(&mut self, listener: Box<dyn FnMut()>) -> ListenerId;

    /// Removes a listener. Returns false if it was not registered.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;

    /// Swaps the reducer used by subsequent dispatches. The current state is kept.
    fn replace_reducer(&mut self, reducer: BoxedReducer<S, X>);
}

/// Creates node stores.
pub trait StoreFactory {
    /// Creates a store from `reducer`, starting from `preloaded` if given.
    fn create_store<S, X>(
        &self,
        reducer: BoxedReducer<S, X>,
        preloaded: Option<S>,
    ) -> Box<dyn NodeStore<S, X>>
    where
        S: 'static,
        X: InitAction + 'static;
}

/// Creates [`Store`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoreFactory;

impl StoreFactory for LocalStoreFactory {
    fn create_store<S, X>(
        &self,
        reducer: BoxedReducer<S, X>,
        preloaded: Option<S>,
    ) -> Box<dyn NodeStore<S, X>>
    where
        S: 'static,
        X: InitAction + 'static,
    {
        Box::new(Store::new(reducer, preloaded))
    }
}
