// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Persistent tree nodes.
//!
//! A [`Node`] is immutable once shared: every update produces a new root and copies only the nodes
//! along the updated path. Untouched subtrees stay shared between the old and the new root, which
//! makes the source and staged trees cheap to fork and cheap to compare: two subtrees that are the
//! same allocation are trivially equal.
//!
//! Each node carries two reserved slots next to its children:
//!
//! - `VALUE`, the last known state at that node, and
//! - `STORE`, the [`LeafStore`] behind a schema leaf. Internal nodes never own a store.

use crate::{Key, KeyPath, store::LeafStore};
use ahash::RandomState;
use std::{collections::HashMap, fmt, rc::Rc};

pub(crate) type Children<S, A> = HashMap<Key, Rc<Node<S, A>>, RandomState>;

/// One node of a persistent store tree.
pub struct Node<S, A> {
    value: Option<S>,
    store: Option<LeafStore<S, A>>,
    children: Children<S, A>,
}

impl<S, A> Node<S, A> {
    /// The node's `VALUE` slot.
    pub fn value(&self) -> Option<&S> {
        self.value.as_ref()
    }

    /// The node's `STORE` slot. Only leaves have one.
    pub fn store(&self) -> Option<&LeafStore<S, A>> {
        self.store.as_ref()
    }

    pub fn get(&self, key: &Key) -> Option<&Rc<Node<S, A>>> {
        self.children.get(key)
    }

    /// Follows `path` down from this node.
    pub fn get_in(&self, path: &[Key]) -> Option<&Node<S, A>> {
        let mut node = self;
        for key in path {
            node = node.children.get(key)?;
        }
        Some(node)
    }

    /// Like [`Node::get_in`], but returns the shared allocation.
    pub fn lookup(root: &Rc<Self>, path: &[Key]) -> Option<Rc<Self>> {
        let mut node = root;
        for key in path {
            node = node.children.get(key)?;
        }
        Some(Rc::clone(node))
    }

    pub fn children(&self) -> impl Iterator<Item = (&Key, &Rc<Node<S, A>>)> {
        self.children.iter()
    }

    pub fn is_leaf(&self) -> bool {
        self.store.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.store.is_none() && self.children.is_empty()
    }

    /// All nodes carrying a value, with their paths relative to this node, sorted by path.
    pub fn values(&self) -> Vec<(KeyPath, &S)> {
        let mut out = Vec::new();
        self.collect_values(KeyPath::root(), &mut out);
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }

    fn collect_values<'a>(&'a self, path: KeyPath, out: &mut Vec<(KeyPath, &'a S)>) {
        if let Some(value) = &self.value {
            out.push((path.clone(), value));
        }
        for (key, child) in &self.children {
            child.collect_values(path.child(key.clone()), out);
        }
    }

    /// Children sorted by key, for stable output.
    fn sorted_children(&self) -> Vec<(&Key, &Rc<Node<S, A>>)> {
        let mut children: Vec<_> = self.children.iter().collect();
        children.sort_by(|(a, _), (b, _)| a.cmp(b));
        children
    }
}

impl<S, A> Node<S, A>
where
    S: Clone + PartialEq,
{
    /// A node holding `value` in its `VALUE` slot and `store` in its `STORE` slot.
    pub(crate) fn leaf(value: S, store: LeafStore<S, A>) -> Self {
        Self {
            value: Some(value),
            store: Some(store),
            children: Children::default(),
        }
    }

    /// Returns `node` with its `VALUE` slot set to `value`.
    ///
    /// If the slot already holds an equal value, `node` itself is returned.
    pub fn with_value(node: &Rc<Self>, value: S) -> Rc<Self> {
        if node.value.as_ref() == Some(&value) {
            return Rc::clone(node);
        }
        let mut next = Rc::clone(node);
        Rc::make_mut(&mut next).value = Some(value);
        next
    }

    /// Returns `node` with `child` under `key`.
    pub fn set_child(node: &Rc<Self>, key: Key, child: Rc<Self>) -> Rc<Self> {
        if node.children.get(&key).is_some_and(|c| Rc::ptr_eq(c, &child)) {
            return Rc::clone(node);
        }
        let mut next = Rc::clone(node);
        Rc::make_mut(&mut next).children.insert(key, child);
        next
    }

    /// Replaces the node at `path` with `f(node)`, creating empty nodes for missing steps.
    ///
    /// Only the nodes along `path` are copied. If `f` returns the node it was given, `root` is
    /// returned unchanged.
    pub fn update_in(
        root: &Rc<Self>,
        path: &[Key],
        f: impl FnOnce(&Rc<Self>) -> Rc<Self>,
    ) -> Rc<Self> {
        let Some((key, rest)) = path.split_first() else {
            return f(root);
        };
        let next_child = match root.children.get(key) {
            Some(child) => Self::update_in(child, rest, f),
            None => Self::update_in(&Rc::new(Self::default()), rest, f),
        };
        Self::set_child(root, key.clone(), next_child)
    }

    /// Recursively merges `overlay` into `base`.
    ///
    /// Wherever both trees define a slot, `overlay` wins. Children only `base` has are kept as
    /// they are. Merging a tree with itself, or with a tree whose every slot `base` already
    /// holds, returns `base` unchanged.
    pub fn merge_deep(base: &Rc<Self>, overlay: &Rc<Self>) -> Rc<Self> {
        if Rc::ptr_eq(base, overlay) {
            return Rc::clone(base);
        }

        let mut merged = match &overlay.value {
            Some(value) => Self::with_value(base, value.clone()),
            None => Rc::clone(base),
        };
        if let Some(store) = &overlay.store
            && merged.store.as_ref() != Some(store)
        {
            Rc::make_mut(&mut merged).store = Some(store.clone());
        }
        for (key, theirs) in &overlay.children {
            let next = match merged.children.get(key) {
                Some(ours) => Self::merge_deep(ours, theirs),
                None => Rc::clone(theirs),
            };
            merged = Self::set_child(&merged, key.clone(), next);
        }
        merged
    }
}

impl<S, A> Default for Node<S, A> {
    fn default() -> Self {
        Self {
            value: None,
            store: None,
            children: Children::default(),
        }
    }
}

impl<S: Clone, A> Clone for Node<S, A> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            store: self.store.clone(),
            children: self.children.clone(),
        }
    }
}

impl<S: PartialEq, A> PartialEq for Node<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.store == other.store
            && self.children.len() == other.children.len()
            && self.children.iter().all(|(key, ours)| {
                other
                    .children
                    .get(key)
                    .is_some_and(|theirs| Rc::ptr_eq(ours, theirs) || ours == theirs)
            })
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Node<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        if let Some(value) = &self.value {
            s.field("value", value);
        }
        if let Some(store) = &self.store {
            s.field("store", store);
        }
        if !self.children.is_empty() {
            s.field("children", &DebugChildren(self.sorted_children()));
        }
        s.finish()
    }
}

struct DebugChildren<'a, S, A>(Vec<(&'a Key, &'a Rc<Node<S, A>>)>);

impl<S: fmt::Debug, A> fmt::Debug for DebugChildren<'_, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k.to_string(), v)))
            .finish()
    }
}
