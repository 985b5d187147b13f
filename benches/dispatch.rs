// (c) Copyright 2025 Helsing GmbH. All rights reserved.
#![cfg_attr(not(target_os = "linux"), allow(dead_code, unused_imports))]

use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use reducer_tree::{Schema, TreeStore, key_path, store::InitAction};
use std::hint::black_box;

#[derive(Debug, Clone, Copy)]
enum Tally {
    Init,
    Add(u64),
}

impl InitAction for Tally {
    fn init() -> Self {
        Tally::Init
    }
}

fn tally(state: Option<&u64>, action: &Tally) -> u64 {
    let state = state.copied().unwrap_or(0);
    match action {
        Tally::Add(n) => state + n,
        Tally::Init => state,
    }
}

/// `n` projects, each with an `open` and a `closed` counter.
fn setup_store(n: usize) -> TreeStore<u64, Tally> {
    let mut schema = Schema::new();
    for project in 0..n {
        for column in ["open", "closed"] {
            schema
                .insert(key_path!["projects", project, column], tally)
                .unwrap();
        }
    }
    TreeStore::new(schema).unwrap()
}

/// Like [`setup_store`], with every `open` counter bumped in transaction mode.
fn setup_staged(n: usize) -> TreeStore<u64, Tally> {
    let mut store = setup_store(n);
    store.transaction(Some(true));
    for project in 0..n {
        store
            .dispatch(key_path!["projects", project, "open"], Tally::Add(1))
            .unwrap();
    }
    store
}

#[library_benchmark]
#[bench::medium(255)]
fn build(n: usize) {
    black_box(setup_store(black_box(n)));
}

#[library_benchmark]
#[bench::medium(setup_store(255))]
fn dispatch_write_through(store: TreeStore<u64, Tally>) {
    let mut store = black_box(store);
    store
        .dispatch(key_path!["projects", 128usize, "open"], Tally::Add(1))
        .unwrap();
    black_box(store);
}

#[library_benchmark]
#[bench::medium(setup_store(255))]
fn dispatch_staged(store: TreeStore<u64, Tally>) {
    let mut store = black_box(store);
    store.transaction(Some(true));
    store
        .dispatch(key_path!["projects", 128usize, "open"], Tally::Add(1))
        .unwrap();
    black_box(store);
}

#[library_benchmark]
#[bench::medium(setup_staged(255))]
fn commit(store: TreeStore<u64, Tally>) {
    let mut store = black_box(store);
    store.commit();
    black_box(store);
}

#[library_benchmark]
#[bench::medium(setup_staged(255))]
fn reset(store: TreeStore<u64, Tally>) {
    let mut store = black_box(store);
    store.reset();
    black_box(store);
}

#[library_benchmark]
#[bench::medium(setup_staged(255))]
fn staged_paths(store: TreeStore<u64, Tally>) {
    let store = black_box(store);
    black_box(store.tree().staged_paths());
}

library_benchmark_group!(
    name = dispatches;
    benchmarks = build, dispatch_write_through, dispatch_staged
);
library_benchmark_group!(
    name = transactions;
    benchmarks = commit, reset, staged_paths
);

#[cfg(target_os = "linux")]
main!(library_benchmark_groups = dispatches, transactions);

#[cfg(not(target_os = "linux"))]
fn main() {}
