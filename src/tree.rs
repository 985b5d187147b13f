// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The store tree: one mutable cell holding the source and the staged tree.
//!
//! Both trees are persistent [`Node`]s addressed by the same [`KeyPath`]s. The source tree is the
//! authoritative state that readers see; the staged tree is a working copy that accumulates
//! speculative writes while transaction mode is on. The two are identical right after a build and
//! after every [`StoreTree::reset`], and they only diverge through writes that skip the source.
//!
//! | Operation | Source | Staged |
//! |-----------|--------|--------|
//! | `write(p, v, true)` | `p := v` | `p := v` |
//! | `write(p, v, false)` | unchanged | `p := v` |
//! | `reset()` | unchanged | `:= source` |
//! | `commit()` | `:= merge(source, staged)` | `:= merge(source, staged)` |
//!
//! Every operation replaces both roots in one step and notifies observers afterwards, so an
//! observer never sees a half-applied transition.
//!
//! Reads and writes at a path go through [`Cursor`]s, which are cheap views made of a weak handle
//! to the cell, a [`Side`], and a path. They never keep the tree alive.

mod cursor;

pub use cursor::{Cursor, ValueCursor};

use crate::{KeyPath, Subscription, node::Node};
use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

/// Which of the two trees an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The authoritative tree.
    Source,
    /// The working copy.
    Staged,
}

/// What an observer watches at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// The `VALUE` slot.
    Value,
    /// The whole node, including everything below it.
    Node,
}

type Listener = Rc<RefCell<dyn FnMut()>>;

struct Observer {
    id: u64,
    side: Side,
    path: KeyPath,
    target: Target,
    listener: Listener,
}

pub(crate) struct Roots<S, A> {
    source: Rc<Node<S, A>>,
    staged: Rc<Node<S, A>>,
}

impl<S, A> Roots<S, A> {
    fn get(&self, side: Side) -> &Rc<Node<S, A>> {
        match side {
            Side::Source => &self.source,
            Side::Staged => &self.staged,
        }
    }

    /// These roots with `side` replaced by `root`.
    fn replace(&self, side: Side, root: Rc<Node<S, A>>) -> Self {
        match side {
            Side::Source => Self {
                source: root,
                staged: Rc::clone(&self.staged),
            },
            Side::Staged => Self {
                source: Rc::clone(&self.source),
                staged: root,
            },
        }
    }
}

impl<S, A> Clone for Roots<S, A> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            staged: Rc::clone(&self.staged),
        }
    }
}

pub(crate) struct Inner<S, A> {
    roots: Roots<S, A>,
    observers: Vec<Observer>,
    next_observer: u64,
}

/// The mutable root holding the source and the staged tree.
///
/// Cloning a `StoreTree` clones the handle, not the trees.
pub struct StoreTree<S, A> {
    inner: Rc<RefCell<Inner<S, A>>>,
}

impl<S, A> StoreTree<S, A> {
    /// Wraps `source` as both the source and the staged tree.
    pub(crate) fn from_source(source: Rc<Node<S, A>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                roots: Roots {
                    staged: Rc::clone(&source),
                    source,
                },
                observers: Vec::new(),
                next_observer: 0,
            })),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Inner<S, A>>> {
        Rc::downgrade(&self.inner)
    }

    /// The current root of one side.
    pub fn root(&self, side: Side) -> Rc<Node<S, A>> {
        Rc::clone(self.inner.borrow().roots.get(side))
    }

    /// A cursor at `path` in the tree on `side`.
    pub fn cursor(&self, side: Side, path: impl Into<KeyPath>) -> Cursor<S, A> {
        Cursor::new(self.downgrade(), side, path.into())
    }

    /// Registers `listener` to run whenever the watched part of the tree changes.
    pub(crate) fn observe(
        &self,
        side: Side,
        path: KeyPath,
        target: Target,
        listener: impl FnMut() + 'static,
    ) -> Subscription
    where
        S: 'static,
        A: 'static,
    {
        observe(&self.inner, side, path, target, listener)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S, A> StoreTree<S, A>
where
    S: Clone + PartialEq,
{
    /// Writes `value` into the `VALUE` slot at `path` of the staged tree, and of the source tree
    /// too if `to_source` is set.
    ///
    /// Missing nodes along `path` are created.
    pub fn write(&self, path: &KeyPath, value: S, to_source: bool) {
        transition(&self.inner, |roots| {
            let staged = Node::update_in(&roots.staged, path, |node| {
                Node::with_value(node, value.clone())
            });
            let source = if to_source {
                Node::update_in(&roots.source, path, |node| Node::with_value(node, value))
            } else {
                Rc::clone(&roots.source)
            };
            Roots { source, staged }
        });
    }

    /// Swaps in `root` as the root of `side`.
    #[cfg(test)]
    pub(crate) fn replace_root(&self, side: Side, root: Rc<Node<S, A>>) {
        transition(&self.inner, |roots| roots.replace(side, root));
    }

    /// Discards all staged changes by pointing the staged tree at the source tree.
    pub fn reset(&self) {
        transition(&self.inner, |roots| Roots {
            source: Rc::clone(&roots.source),
            staged: Rc::clone(&roots.source),
        });
    }

    /// Deep-merges the staged tree into the source tree and makes the result both trees.
    ///
    /// Staged values win wherever both trees hold one. Nodes written to the source directly
    /// since the last reset are preserved rather than replaced wholesale.
    pub fn commit(&self) {
        transition(&self.inner, |roots| {
            let merged = Node::merge_deep(&roots.source, &roots.staged);
            Roots {
                source: Rc::clone(&merged),
                staged: merged,
            }
        });
    }

    /// Returns true if the staged tree differs from the source tree.
    pub fn has_staged_changes(&self) -> bool {
        let inner = self.inner.borrow();
        let Roots { source, staged } = &inner.roots;
        !(Rc::ptr_eq(source, staged) || source == staged)
    }

    /// The paths whose staged value differs from their source value, sorted.
    pub fn staged_paths(&self) -> Vec<KeyPath> {
        let inner = self.inner.borrow();
        let mut out = Vec::new();
        diff(
            KeyPath::root(),
            Some(&inner.roots.source),
            Some(&inner.roots.staged),
            &mut out,
        );
        out.sort();
        out
    }
}

fn diff<S: PartialEq, A>(
    path: KeyPath,
    source: Option<&Rc<Node<S, A>>>,
    staged: Option<&Rc<Node<S, A>>>,
    out: &mut Vec<KeyPath>,
) {
    if let (Some(a), Some(b)) = (source, staged)
        && Rc::ptr_eq(a, b)
    {
        return;
    }
    if source.and_then(|n| n.value()) != staged.and_then(|n| n.value()) {
        out.push(path.clone());
    }
    let mut keys: Vec<_> = source
        .into_iter()
        .chain(staged)
        .flat_map(|node| node.children().map(|(key, _)| key))
        .collect();
    keys.sort();
    keys.dedup();
    for key in keys {
        diff(
            path.child(key.clone()),
            source.and_then(|n| n.get(key)),
            staged.and_then(|n| n.get(key)),
            out,
        );
    }
}

/// Applies `f` to the roots, then runs every observer whose watched part changed.
///
/// Listeners run after the cell is released, so they may read the tree. A listener that is
/// already running (because it caused this transition) is skipped.
pub(crate) fn transition<S, A>(
    cell: &RefCell<Inner<S, A>>,
    f: impl FnOnce(&Roots<S, A>) -> Roots<S, A>,
) where
    S: PartialEq,
{
    let triggered: Vec<Listener> = {
        let mut inner = cell.borrow_mut();
        let before = inner.roots.clone();
        let after = f(&before);
        if Rc::ptr_eq(&before.source, &after.source) && Rc::ptr_eq(&before.staged, &after.staged) {
            return;
        }
        inner.roots = after;
        inner
            .observers
            .iter()
            .filter(|observer| observer.changed(&before, &inner.roots))
            .map(|observer| Rc::clone(&observer.listener))
            .collect()
    };
    for listener in triggered {
        if let Ok(mut listener) = listener.try_borrow_mut() {
            (*listener)();
        }
    }
}

pub(crate) fn observe<S, A>(
    cell: &Rc<RefCell<Inner<S, A>>>,
    side: Side,
    path: KeyPath,
    target: Target,
    listener: impl FnMut() + 'static,
) -> Subscription
where
    S: 'static,
    A: 'static,
{
    let id = {
        let mut inner = cell.borrow_mut();
        let id = inner.next_observer;
        inner.next_observer += 1;
        inner.observers.push(Observer {
            id,
            side,
            path,
            target,
            listener: Rc::new(RefCell::new(listener)),
        });
        id
    };
    let cell = Rc::downgrade(cell);
    Subscription::new(move || {
        if let Some(cell) = cell.upgrade() {
            cell.borrow_mut().observers.retain(|observer| observer.id != id);
        }
    })
}

impl Observer {
    fn changed<S: PartialEq, A>(&self, before: &Roots<S, A>, after: &Roots<S, A>) -> bool {
        let old = before.get(self.side);
        let new = after.get(self.side);
        if Rc::ptr_eq(old, new) {
            return false;
        }
        let old = old.get_in(&self.path);
        let new = new.get_in(&self.path);
        match self.target {
            Target::Value => old.and_then(Node::value) != new.and_then(Node::value),
            Target::Node => match (old, new) {
                (None, None) => false,
                (Some(old), Some(new)) => !(std::ptr::eq(old, new) || old == new),
                _ => true,
            },
        }
    }
}

impl<S, A> Clone for StoreTree<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug, A> fmt::Debug for StoreTree<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StoreTree")
            .field("source", &inner.roots.source)
            .field("staged", &inner.roots.staged)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;
    use std::cell::Cell;

    type TestTree = StoreTree<i64, ()>;

    fn tree() -> TestTree {
        let source = [("a", 0), ("b", 0)]
            .into_iter()
            .fold(Rc::new(Node::default()), |root, (key, value)| {
                Node::update_in(&root, &[Key::from(key)], |node| Node::with_value(node, value))
            });
        let source = Node::update_in(&source, &KeyPath::from(["c", "d"]), |node| {
            Node::with_value(node, 0)
        });
        StoreTree::from_source(source)
    }

    fn value(tree: &TestTree, side: Side, path: impl Into<KeyPath>) -> Option<i64> {
        let path: KeyPath = path.into();
        tree.root(side).get_in(&path).and_then(Node::value).copied()
    }

    #[test]
    fn starts_in_sync() {
        let tree = tree();
        assert!(Rc::ptr_eq(&tree.root(Side::Source), &tree.root(Side::Staged)));
        assert!(!tree.has_staged_changes());
    }

    #[test]
    fn write_through_updates_both_sides() {
        let tree = tree();
        tree.write(&KeyPath::from("a"), 1, true);
        assert_eq!(value(&tree, Side::Source, "a"), Some(1));
        assert_eq!(value(&tree, Side::Staged, "a"), Some(1));
        assert!(!tree.has_staged_changes());
    }

    #[test]
    fn staged_write_leaves_source() {
        let tree = tree();
        tree.write(&KeyPath::from("a"), 1, false);
        assert_eq!(value(&tree, Side::Source, "a"), Some(0));
        assert_eq!(value(&tree, Side::Staged, "a"), Some(1));
        assert!(tree.has_staged_changes());
        assert_eq!(tree.staged_paths(), vec![KeyPath::from("a")]);
    }

    #[test]
    fn reset_discards_staged_writes() {
        let tree = tree();
        tree.write(&KeyPath::from("a"), 1, false);
        tree.reset();
        assert_eq!(value(&tree, Side::Staged, "a"), Some(0));
        let staged = tree.root(Side::Staged);
        tree.reset();
        assert!(Rc::ptr_eq(&staged, &tree.root(Side::Staged)));
    }

    #[test]
    fn commit_keeps_direct_source_writes() {
        let tree = tree();
        tree.write(&KeyPath::from("a"), 1, false);
        tree.write(&KeyPath::from(["c", "d"]), 2, true);
        tree.commit();

        assert_eq!(value(&tree, Side::Source, "a"), Some(1));
        assert_eq!(value(&tree, Side::Source, ["c", "d"]), Some(2));
        assert_eq!(value(&tree, Side::Source, "b"), Some(0));
        assert!(!tree.has_staged_changes());

        let source = tree.root(Side::Source);
        tree.commit();
        assert!(Rc::ptr_eq(&source, &tree.root(Side::Source)));
    }

    #[test]
    fn observers_fire_only_for_their_side_and_path() {
        let tree = tree();
        let hits = Rc::new(Cell::new(0));
        let _subscription = tree.observe(Side::Source, KeyPath::from("a"), Target::Value, {
            let hits = Rc::clone(&hits);
            move || hits.set(hits.get() + 1)
        });

        tree.write(&KeyPath::from("a"), 1, false);
        assert_eq!(hits.get(), 0, "staged-only write must not notify source observers");
        tree.write(&KeyPath::from("b"), 1, true);
        assert_eq!(hits.get(), 0, "write elsewhere must not notify");
        tree.commit();
        assert_eq!(hits.get(), 1);
        tree.write(&KeyPath::from("a"), 1, true);
        assert_eq!(hits.get(), 1, "writing an equal value must not notify");
    }

    #[test]
    fn node_observers_see_descendant_changes() {
        let tree = tree();
        let hits = Rc::new(Cell::new(0));
        let subscription = tree.observe(Side::Source, KeyPath::from("c"), Target::Node, {
            let hits = Rc::clone(&hits);
            move || hits.set(hits.get() + 1)
        });

        tree.write(&KeyPath::from(["c", "d"]), 5, true);
        assert_eq!(hits.get(), 1);

        subscription.unsubscribe();
        tree.write(&KeyPath::from(["c", "d"]), 6, true);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listeners_may_read_the_tree() {
        let tree = tree();
        let seen = Rc::new(Cell::new(None));
        let _subscription = tree.observe(Side::Source, KeyPath::from("a"), Target::Value, {
            let seen = Rc::clone(&seen);
            let cursor = tree.cursor(Side::Source, "a").value();
            move || seen.set(cursor.deref())
        });

        tree.write(&KeyPath::from("a"), 9, true);
        assert_eq!(seen.get(), Some(9));
    }
}
