use super::{Inner, Side, Target, observe, transition};
use crate::{Key, KeyPath, Subscription, node::Node, store::LeafStore};
use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

/// A view of the node at one path of one side of a [`StoreTree`](super::StoreTree).
///
/// A cursor does not keep the tree alive. Once the tree is dropped, every read through the cursor
/// returns `None` and every write is ignored.
pub struct Cursor<S, A> {
    tree: Weak<RefCell<Inner<S, A>>>,
    side: Side,
    path: KeyPath,
}

impl<S, A> Cursor<S, A> {
    pub(crate) fn new(tree: Weak<RefCell<Inner<S, A>>>, side: Side, path: KeyPath) -> Self {
        Self { tree, side, path }
    }

    /// The fully-qualified path of this cursor.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The node currently at this cursor's path, if there is one.
    pub fn deref(&self) -> Option<Rc<Node<S, A>>> {
        let tree = self.tree.upgrade()?;
        let inner = tree.borrow();
        Node::lookup(inner.roots.get(self.side), &self.path)
    }

    pub fn exists(&self) -> bool {
        self.deref().is_some()
    }

    /// The leaf store at this cursor's path, if the node is a leaf.
    pub fn store(&self) -> Option<LeafStore<S, A>> {
        self.deref().and_then(|node| node.store().cloned())
    }

    #[must_use]
    pub fn child(&self, key: impl Into<Key>) -> Self {
        Self {
            tree: Weak::clone(&self.tree),
            side: self.side,
            path: self.path.child(key),
        }
    }

    /// A cursor at this node's `VALUE` slot.
    pub fn value(&self) -> ValueCursor<S, A> {
        ValueCursor {
            tree: Weak::clone(&self.tree),
            side: self.side,
            path: self.path.clone(),
        }
    }

    /// Runs `listener` whenever the node at this path, or anything below it, changes.
    pub fn observe(&self, listener: impl FnMut() + 'static) -> Subscription
    where
        S: 'static,
        A: 'static,
    {
        match self.tree.upgrade() {
            Some(tree) => observe(&tree, self.side, self.path.clone(), Target::Node, listener),
            None => Subscription::new(|| {}),
        }
    }
}

/// A view of the `VALUE` slot of the node at one path of one side.
pub struct ValueCursor<S, A> {
    tree: Weak<RefCell<Inner<S, A>>>,
    side: Side,
    path: KeyPath,
}

impl<S, A> ValueCursor<S, A> {
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The value currently in the slot.
    pub fn deref(&self) -> Option<S>
    where
        S: Clone,
    {
        let tree = self.tree.upgrade()?;
        let inner = tree.borrow();
        inner
            .roots
            .get(self.side)
            .get_in(&self.path)
            .and_then(Node::value)
            .cloned()
    }

    /// The value currently in the slot, or `not_set` if the slot is empty.
    pub fn deref_or(&self, not_set: S) -> S
    where
        S: Clone,
    {
        self.deref().unwrap_or(not_set)
    }

    pub fn exists(&self) -> bool {
        let Some(tree) = self.tree.upgrade() else {
            return false;
        };
        let inner = tree.borrow();
        inner
            .roots
            .get(self.side)
            .get_in(&self.path)
            .is_some_and(|node| node.value().is_some())
    }

    /// Runs `listener` whenever the value in the slot changes.
    pub fn observe(&self, listener: impl FnMut() + 'static) -> Subscription
    where
        S: 'static,
        A: 'static,
    {
        match self.tree.upgrade() {
            Some(tree) => observe(&tree, self.side, self.path.clone(), Target::Value, listener),
            None => Subscription::new(|| {}),
        }
    }
}

impl<S, A> ValueCursor<S, A>
where
    S: Clone + PartialEq,
{
    /// Replaces the value with `f(current)` and returns the new value.
    ///
    /// Missing nodes along the path are created. Returns `None` if the tree no longer exists.
    pub fn update(&self, f: impl FnOnce(Option<&S>) -> S) -> Option<S> {
        let tree = self.tree.upgrade()?;
        let current = self.deref();
        let value = f(current.as_ref());
        transition(&tree, |roots| {
            let root = Node::update_in(roots.get(self.side), &self.path, |node| {
                Node::with_value(node, value.clone())
            });
            roots.replace(self.side, root)
        });
        Some(value)
    }

    pub fn set(&self, value: S) -> Option<S> {
        self.update(|_| value)
    }

    /// Writes `value` through this cursor and through `other` in a single transition.
    ///
    /// Observers see both writes at once. If the cursors belong to different trees, the writes
    /// happen one after the other, this cursor first.
    pub(crate) fn set_with(&self, other: &Self, value: S) {
        let (Some(tree), Some(other_tree)) = (self.tree.upgrade(), other.tree.upgrade()) else {
            self.set(value.clone());
            other.set(value);
            return;
        };
        if !Rc::ptr_eq(&tree, &other_tree) {
            self.set(value.clone());
            other.set(value);
            return;
        }
        transition(&tree, |roots| {
            let first = Node::update_in(roots.get(self.side), &self.path, |node| {
                Node::with_value(node, value.clone())
            });
            let roots = roots.replace(self.side, first);
            let second = Node::update_in(roots.get(other.side), &other.path, |node| {
                Node::with_value(node, value)
            });
            roots.replace(other.side, second)
        });
    }
}

impl<S, A> Clone for Cursor<S, A> {
    fn clone(&self) -> Self {
        Self {
            tree: Weak::clone(&self.tree),
            side: self.side,
            path: self.path.clone(),
        }
    }
}

impl<S, A> Clone for ValueCursor<S, A> {
    fn clone(&self) -> Self {
        Self {
            tree: Weak::clone(&self.tree),
            side: self.side,
            path: self.path.clone(),
        }
    }
}

impl<S, A> fmt::Debug for Cursor<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({:?} {})", self.side, self.path)
    }
}

impl<S, A> fmt::Debug for ValueCursor<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueCursor({:?} {})", self.side, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::StoreTree;

    fn tree() -> StoreTree<i64, ()> {
        StoreTree::from_source(Rc::new(Node::default()))
    }

    #[test]
    fn update_creates_the_path() {
        let tree = tree();
        let cursor = tree.cursor(Side::Staged, ["a", "b"]).value();
        assert!(!cursor.exists());
        assert_eq!(cursor.deref_or(-1), -1);

        assert_eq!(cursor.update(|current| current.copied().unwrap_or(0) + 1), Some(1));
        assert_eq!(cursor.update(|current| current.copied().unwrap_or(0) + 1), Some(2));
        assert_eq!(cursor.deref(), Some(2));
        assert!(tree.cursor(Side::Staged, "a").exists());
        assert!(!tree.cursor(Side::Source, "a").exists());
    }

    #[test]
    fn child_extends_the_path() {
        let tree = tree();
        let cursor = tree.cursor(Side::Source, "a").child("b").child(2usize);
        assert_eq!(cursor.path().to_string(), "a.b[2]");
        assert_eq!(format!("{:?}", cursor.value()), "ValueCursor(Source a.b[2])");
    }

    #[test]
    fn set_with_writes_both_sides_in_one_step() {
        let tree = tree();
        let staged = tree.cursor(Side::Staged, "a").value();
        let source = tree.cursor(Side::Source, "a").value();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _subscription = staged.observe({
            let seen = Rc::clone(&seen);
            let source = source.clone();
            move || seen.borrow_mut().push(source.deref())
        });

        staged.set_with(&source, 7);
        assert_eq!(*seen.borrow(), vec![Some(7)]);
        assert_eq!(source.deref(), Some(7));
    }

    #[test]
    fn cursor_outliving_its_tree() {
        let cursor = {
            let tree = tree();
            tree.cursor(Side::Source, "a").value()
        };
        assert_eq!(cursor.set(1), None);
        assert_eq!(cursor.deref(), None);
        assert!(!cursor.exists());
        cursor.observe(|| {}).unsubscribe();
    }
}
