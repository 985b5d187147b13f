use super::{BoxedReducer, InitAction, ListenerId, NodeStore};
use std::fmt;

/// The default [`NodeStore`]: a reducer, its current state, and a list of listeners.
///
/// # Example
///
/// ```
/// use reducer_tree::store::{NodeStore, Store};
///
/// let mut store = Store::<i64, Option<i64>>::new(
///     Box::new(|state, action| state.copied().unwrap_or(0) + action.unwrap_or(0)),
///     None,
/// );
/// store.dispatch(Some(2));
/// store.dispatch(Some(3));
/// assert_eq!(*store.state(), 5);
/// ```
pub struct Store<S, X> {
    reducer: BoxedReducer<S, X>,
    state: S,
    listeners: Vec<(ListenerId, Box<dyn FnMut()>)>,
    next_listener: u64,
}

impl<S, X> Store<S, X>
where
    X: InitAction,
{
    /// Creates the store and runs the reducer once with [`InitAction::init`].
    ///
    /// The reducer sees `preloaded` as its current state, or `None` if there is none.
    pub fn new(reducer: BoxedReducer<S, X>, preloaded: Option<S>) -> Self {
        let state = reducer(preloaded.as_ref(), &X::init());
        Self {
            reducer,
            state,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }
}

impl<S, X> NodeStore<S, X> for Store<S, X> {
    fn state(&self) -> &S {
        &self.state
    }

    fn dispatch(&mut self, action: X) -> X {
        self.state = (self.reducer)(Some(&self.state), &action);
        for (_, listener) in &mut self.listeners {
            listener();
        }
        action
    }

    fn subscribe(&mut self, listener: Box<dyn FnMut()>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn replace_reducer(&mut self, reducer: BoxedReducer<S, X>) {
        self.reducer = reducer;
    }
}

impl<S: fmt::Debug, X> fmt::Debug for Store<S, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
