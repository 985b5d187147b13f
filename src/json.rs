// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! JSON representation
//!
//! A tree renders as nested JSON objects keyed by path segment. Each leaf renders as its value.
//! Index keys become their decimal string, since JSON object keys are always strings.
//!
//! # Example
//!
//! For the schema `{a: counter, b: {c: counter}}` right after build:
//!
//! ```json
//! {
//!   "a": 0,
//!   "b": {
//!     "c": 0
//!   }
//! }
//! ```
use crate::{
    Key,
    node::Node,
    store::{INIT_ACTION_TYPE, InitAction},
};
use serde::Serialize;
use serde_json::{Map, Value};

impl<S: Serialize, A> Node<S, A> {
    /// Renders this node and everything below it.
    ///
    /// A node with children renders as an object of its children. A node without children renders
    /// as its value, or as an empty object if it has none.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self.value() {
            Some(value) if self.children().next().is_none() => serde_json::to_value(value),
            _ => {
                let mut object = Map::new();
                for (key, child) in self.children() {
                    object.insert(key_to_string(key), child.to_json()?);
                }
                Ok(Value::Object(object))
            }
        }
    }
}

fn key_to_string(key: &Key) -> String {
    match key {
        Key::Name(name) => name.clone(),
        Key::Index(index) => index.to_string(),
    }
}

/// Seeds stores whose actions are plain JSON with `{"type": "@@reducer-tree/INIT"}`.
impl InitAction for Value {
    fn init() -> Self {
        serde_json::json!({ "type": INIT_ACTION_TYPE })
    }
}
