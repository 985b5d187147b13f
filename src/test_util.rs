// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{KeyPath, Side, TreeStore, store::InitAction};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counter {
    Init,
    Inc,
    Add(i64),
}

impl InitAction for Counter {
    fn init() -> Self {
        Self::Init
    }
}

pub(crate) fn counter(state: Option<&i64>, action: &Counter) -> i64 {
    let state = state.copied().unwrap_or(0);
    match action {
        Counter::Inc => state + 1,
        Counter::Add(n) => state + n,
        Counter::Init => state,
    }
}

/// Installs a test subscriber once, filtered by `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One line per value in either tree, `path: source | staged`, with `-` for a missing value.
pub(crate) fn outline(store: &TreeStore<i64, Counter>) -> String {
    let mut rows = BTreeMap::<KeyPath, [Option<i64>; 2]>::new();
    for (column, side) in [Side::Source, Side::Staged].into_iter().enumerate() {
        let root = store.tree().root(side);
        for (path, value) in root.values() {
            rows.entry(path).or_default()[column] = Some(*value);
        }
    }

    let cell = |value: Option<i64>| value.map_or_else(|| "-".to_owned(), |v| v.to_string());
    rows.into_iter()
        .map(|(path, [source, staged])| format!("{path}: {} | {}", cell(source), cell(staged)))
        .collect::<Vec<_>>()
        .join("\n")
}
