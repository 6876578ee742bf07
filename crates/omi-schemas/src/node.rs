//! Shape-tagged view over JSON values
//!
//! Every recursive walk in the engine matches on [`JsonNode`] so that each
//! recursion site handles the three shapes a document tree can take.
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};

/// A JSON value classified as scalar, object or array
#[derive(Debug, Clone, Copy)]
pub enum JsonNode<'a> {
    /// null, boolean, number or string
    Scalar(&'a Value),
    /// A nested object
    Object(&'a Map<String, Value>),
    /// A list of values
    Array(&'a [Value]),
}

impl<'a> JsonNode<'a> {
    /// Classify a value
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => JsonNode::Object(map),
            Value::Array(items) => JsonNode::Array(items),
            scalar => JsonNode::Scalar(scalar),
        }
    }

    /// Objects reachable from this node: itself, or the object items of an array
    ///
    /// Arrays of arrays are flattened.
    pub fn objects(self) -> Vec<(Option<usize>, &'a Map<String, Value>)> {
        match self {
            JsonNode::Scalar(_) => Vec::new(),
            JsonNode::Object(map) => vec![(None, map)],
            JsonNode::Array(items) => items
                .iter()
                .enumerate()
                .flat_map(|(idx, item)| {
                    JsonNode::of(item)
                        .objects()
                        .into_iter()
                        .map(move |(_, map)| (Some(idx), map))
                })
                .collect(),
        }
    }
}

/// Whether a value counts as absent: null, empty string or whitespace-only string
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Whether a value is a present string that is empty or whitespace-only
pub fn is_blank_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}
