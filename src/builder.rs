// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{
    Key, KeyPath, Schema, SchemaError,
    node::Node,
    schema::SchemaNode,
    store::{InitAction, LeafStore, StoreFactory},
    transaction::wrap,
    tree::StoreTree,
};
use std::{collections::HashSet, rc::Rc};
use tracing::{debug, trace};

/// Builds the store tree for `schema`.
///
/// Every reducer gets its own store, created by `factory` with the reducer wrapped in the relay.
/// The store's initial state goes into the leaf's `VALUE` slot and the store itself into its
/// `STORE` slot. When the walk is done, the staged tree is the source tree.
pub fn build<S, A, F>(schema: &Schema<S, A>, factory: &F) -> Result<StoreTree<S, A>, SchemaError>
where
    S: Clone + PartialEq + 'static,
    A: InitAction + 'static,
    F: StoreFactory,
{
    let mut root = Rc::new(Node::default());
    let mut leaves = 0;
    convert(schema, factory, &KeyPath::root(), &mut root, &mut leaves)?;
    debug!(leaves, "built store tree");
    Ok(StoreTree::from_source(root))
}

fn convert<S, A, F>(
    schema: &Schema<S, A>,
    factory: &F,
    path: &KeyPath,
    root: &mut Rc<Node<S, A>>,
    leaves: &mut usize,
) -> Result<(), SchemaError>
where
    S: Clone + PartialEq + 'static,
    A: InitAction + 'static,
    F: StoreFactory,
{
    let mut seen = HashSet::<&Key, ahash::RandomState>::default();
    for (key, node) in schema.entries() {
        let path = path.child(key.clone());
        if !seen.insert(key) {
            return Err(SchemaError::DuplicateKey { path });
        }
        match node {
            SchemaNode::Tree(schema) => {
                *root = Node::update_in(root, &path, Rc::clone);
                convert(schema, factory, &path, root, leaves)?;
            }
            SchemaNode::Leaf(reducer) => {
                let store = factory.create_store(wrap(Rc::clone(reducer)), None);
                let value = store.state().clone();
                trace!(%path, "created leaf store");
                let leaf = Rc::new(Node::leaf(value, LeafStore::new(store)));
                *root = Node::update_in(root, &path, |_| leaf);
                *leaves += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::LocalStoreFactory,
        test_util::{Counter, counter},
        tree::Side,
    };

    #[test]
    fn leaves_carry_initial_state_and_store() {
        let schema = Schema::new()
            .leaf("a", counter)
            .subtree("b", Schema::new().leaf("c", counter));
        let tree = build(&schema, &LocalStoreFactory).unwrap();

        let source = tree.root(Side::Source);
        for path in [KeyPath::from("a"), KeyPath::from(["b", "c"])] {
            let leaf = source.get_in(&path).unwrap();
            assert_eq!(leaf.value(), Some(&0));
            assert_eq!(leaf.store().map(LeafStore::state), Some(0));
        }
        let branch = source.get_in(&KeyPath::from("b")).unwrap();
        assert!(branch.value().is_none());
        assert!(!branch.is_leaf());
        assert!(Rc::ptr_eq(&source, &tree.root(Side::Staged)));
    }

    #[test]
    fn one_store_per_leaf() {
        let schema = Schema::new().leaf("a", counter).leaf("b", counter);
        let tree = build(&schema, &LocalStoreFactory).unwrap();
        let store = |key: &str| tree.cursor(Side::Source, key).store().unwrap();
        assert_ne!(store("a"), store("b"));
        assert_eq!(store("a"), store("a"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let schema: Schema<i64, Counter> = Schema::new()
            .subtree("b", Schema::new().leaf("c", counter).leaf("c", counter));
        assert_eq!(
            build(&schema, &LocalStoreFactory).unwrap_err(),
            SchemaError::DuplicateKey {
                path: KeyPath::from(["b", "c"])
            }
        );
    }

    #[test]
    fn empty_subtrees_become_empty_nodes() {
        let schema: Schema<i64, Counter> = Schema::new().subtree("empty", Schema::new());
        let tree = build(&schema, &LocalStoreFactory).unwrap();
        let node = tree.cursor(Side::Source, "empty").deref().unwrap();
        assert!(node.is_empty());
    }
}
