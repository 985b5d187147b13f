// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The example edits a small document in transaction mode, throws one draft away with a reset,
//! keeps another with a commit, and uses `transact` to roll back a failed edit.

use reducer_tree::{PathError, Side, TreeStore, key_path, schema, store::InitAction};
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
enum Edit {
    Init,
    Append(&'static str),
    Clear,
}

impl InitAction for Edit {
    fn init() -> Self {
        Edit::Init
    }
}

fn text(state: Option<&String>, edit: &Edit) -> String {
    let mut state = state.cloned().unwrap_or_default();
    match edit {
        Edit::Append(s) => state.push_str(s),
        Edit::Clear => state.clear(),
        Edit::Init => {}
    }
    state
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = TreeStore::new(schema! {
        "title" => text,
        "sections" => {
            "intro" => text,
            "body" => text
        }
    })?;
    doc.dispatch("title", Edit::Append("Release notes"))?;

    // A draft that gets discarded.
    doc.transaction(Some(true));
    doc.dispatch(["sections", "intro"], Edit::Append("Draft intro"))?;
    println!("draft:    {}", doc.to_json(Side::Staged)?);
    doc.reset();
    println!("reset:    {}", doc.to_json(Side::Source)?);

    // A draft that gets kept. The leaf store still remembers the discarded text, so clear it.
    doc.dispatch(["sections", "intro"], Edit::Clear)?;
    doc.dispatch(["sections", "intro"], Edit::Append("Faster commits."))?;
    doc.commit();
    doc.transaction(Some(false));
    println!("commit:   {}", doc.to_json(Side::Source)?);

    // An edit that fails half-way rolls back as a whole.
    let failed = doc.transact(|doc| {
        doc.dispatch(key_path!["sections", "body"], Edit::Append("Half an edit"))?;
        doc.dispatch(key_path!["sections", "outro"], Edit::Append("Never lands"))
    });
    match failed {
        Err(PathError::NotFound { path }) => println!("rollback: nothing at {path}"),
        other => println!("unexpected: {other:?}"),
    }
    println!("final:    {}", doc.to_json(Side::Source)?);
    Ok(())
}
