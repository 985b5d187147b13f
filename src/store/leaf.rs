use super::{BoxedReducer, ListenerId, NodeStore};
use crate::{Subscription, transaction::RelayAction};
use std::{cell::RefCell, fmt, rc::Rc};

type Shared<S, A> = Rc<RefCell<Box<dyn NodeStore<S, RelayAction<S, A>>>>>;

type Listener = Rc<RefCell<dyn FnMut()>>;

#[derive(Default)]
struct Listeners {
    entries: Vec<(ListenerId, Listener)>,
    next: u64,
}

/// Handle to the isolated store behind one schema leaf.
///
/// Both the source and the staged tree hold a clone of the same handle in the leaf's `STORE`
/// slot. Two handles are equal if they point at the same store.
///
/// The store is only borrowed while its reducer runs. Tree writes and listeners happen after that,
/// so both may read [`LeafStore::state`].
pub struct LeafStore<S, A> {
    store: Shared<S, A>,
    listeners: Rc<RefCell<Listeners>>,
}

impl<S, A> LeafStore<S, A> {
    pub(crate) fn new(store: Box<dyn NodeStore<S, RelayAction<S, A>>>) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
            listeners: Rc::default(),
        }
    }

    /// The store's local state.
    ///
    /// This tracks the last value the leaf reducer produced, regardless of transaction mode. Read
    /// the tree to see what was actually written to the source or staged side.
    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.store.borrow().state().clone()
    }

    /// Runs the leaf reducer, then writes a routed result into the tree and notifies listeners.
    pub(crate) fn dispatch(&self, action: RelayAction<S, A>) -> RelayAction<S, A>
    where
        S: Clone + PartialEq,
    {
        let action = self.store.borrow_mut().dispatch(action);
        if let RelayAction::ReduceAtPath(routed) = &action {
            routed.write(self.state());
        }
        self.notify();
        action
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (*listener)();
            }
        }
    }

    pub(crate) fn replace_reducer(&self, reducer: BoxedReducer<S, RelayAction<S, A>>) {
        self.store.borrow_mut().replace_reducer(reducer);
    }

    /// Registers a listener that runs after every dispatch to this leaf.
    ///
    /// Unlike tree observers, the listener runs once per dispatch even if the reducer returned an
    /// equal state. It runs after the result has been written into the tree.
    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = ListenerId(listeners.next);
            listeners.next += 1;
            listeners
                .entries
                .push((id, Rc::new(RefCell::new(listener))));
            id
        };
        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .borrow_mut()
                    .entries
                    .retain(|(registered, _)| *registered != id);
            }
        })
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

impl<S, A> Clone for LeafStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<S, A> PartialEq for LeafStore<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<S, A> Eq for LeafStore<S, A> {}

impl<S, A> fmt::Debug for LeafStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafStore({:p})", Rc::as_ptr(&self.store))
    }
}
