// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The example composes three independent counters into one tree, stages a few increments, and
//! shows how subscribers only hear about changes once they reach the source tree.

use reducer_tree::{Side, TreeStore, schema, store::InitAction};
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Init,
    Inc,
    Add(i64),
}

impl InitAction for Action {
    fn init() -> Self {
        Action::Init
    }
}

fn counter(state: Option<&i64>, action: &Action) -> i64 {
    let state = state.copied().unwrap_or(0);
    match action {
        Action::Inc => state + 1,
        Action::Add(n) => state + n,
        Action::Init => state,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut store = TreeStore::new(schema! {
        "visits" => counter,
        "clicks" => {
            "header" => counter,
            "footer" => counter
        }
    })?;

    // Subscribers watch the source tree only.
    let visits = store.get_tree().child("visits").value();
    let _subscription = store.subscribe("visits", move || {
        println!("  -> visits is now {}", visits.deref_or(0));
    });

    println!("Dispatching with transaction mode off:");
    store.dispatch("visits", Action::Inc)?;
    store.dispatch(["clicks", "header"], Action::Add(3))?;

    println!("Staging two more visits:");
    store.transaction(Some(true));
    store.dispatch("visits", Action::Inc)?;
    store.dispatch("visits", Action::Inc)?;
    println!(
        "  source = {}, staged = {}",
        store.get_state("visits")?,
        store.staged_state("visits")?
    );
    println!("  staged paths: {:?}", store.tree().staged_paths());

    println!("Committing:");
    store.commit();

    println!("Final tree: {}", store.to_json(Side::Source)?);
    Ok(())
}
