//! Tests for discarding staged changes.
//!
//! A reset points the staged tree back at the source tree. Whatever was dispatched in transaction
//! mode since the last commit or reset is gone; whatever was written through stays.

use reducer_tree::{PathError, Side, TreeStore, schema};
use std::rc::Rc;

fn append(state: Option<&String>, action: &&'static str) -> String {
    let mut state = state.cloned().unwrap_or_default();
    if !action.starts_with("@@") {
        state.push_str(action);
    }
    state
}

fn store() -> TreeStore<String, &'static str> {
    TreeStore::new(schema! {
        "title" => append,
        "body" => { "intro" => append, "outro" => append }
    })
    .unwrap()
}

#[test]
fn reset_discards_staged_dispatches() {
    let mut store = store();
    store.transaction(Some(true));
    store.dispatch("title", "Draft").unwrap();
    store.dispatch(["body", "intro"], "Hello").unwrap();
    assert!(store.has_staged_changes());

    store.reset();
    assert!(!store.has_staged_changes());
    assert_eq!(store.get_state("title").unwrap(), "");
    assert_eq!(store.staged_state("title").unwrap(), "");
    assert_eq!(store.get_state(["body", "intro"]).unwrap(), "");
}

#[test]
fn reset_keeps_written_through_dispatches() {
    let mut store = store();
    store.dispatch("title", "Final").unwrap();

    store.transaction(Some(true));
    store.dispatch(["body", "outro"], "Bye").unwrap();
    store.reset();

    assert_eq!(store.get_state("title").unwrap(), "Final");
    assert_eq!(store.get_state(["body", "outro"]).unwrap(), "");
}

#[test]
fn second_reset_is_a_no_op() {
    let mut store = store();
    store.transaction(Some(true));
    store.dispatch("title", "x").unwrap();
    store.reset();

    let source = store.tree().root(Side::Source);
    let staged = store.tree().root(Side::Staged);
    assert!(Rc::ptr_eq(&source, &staged));

    store.reset();
    assert!(Rc::ptr_eq(&source, &store.tree().root(Side::Source)));
    assert!(Rc::ptr_eq(&staged, &store.tree().root(Side::Staged)));
}

#[test]
fn leaf_stores_keep_their_own_state_across_reset() {
    let mut store = store();
    store.transaction(Some(true));
    store.dispatch("title", "a").unwrap();
    store.reset();

    let leaf = store.get_tree().child("title").store().unwrap();
    assert_eq!(leaf.state(), "a");

    store.transaction(Some(false));
    store.dispatch("title", "b").unwrap();
    assert_eq!(store.get_state("title").unwrap(), "ab");
}

#[test]
fn failed_transact_rolls_back() {
    let mut store = store();
    store.dispatch("title", "Kept").unwrap();

    let result = store.transact(|store| {
        store.dispatch(["body", "intro"], "Lost")?;
        store.dispatch(["body", "missing"], "boom")
    });

    assert_eq!(
        result,
        Err(PathError::NotFound {
            path: ["body", "missing"].into()
        })
    );
    assert!(!store.in_transaction());
    assert!(!store.has_staged_changes());
    assert_eq!(store.get_state("title").unwrap(), "Kept");
    assert_eq!(store.get_state(["body", "intro"]).unwrap(), "");
}

#[test]
fn transact_restores_the_previous_flag() {
    let mut store = store();
    store.transaction(Some(true));
    store
        .transact(|store| store.dispatch("title", "T").map(drop))
        .unwrap();
    assert!(store.in_transaction());
    assert_eq!(store.get_state("title").unwrap(), "T");
}
