//! JSON-LD compact key expansion
//!
//! Rewrites the property keys of a document to absolute identifiers using an
//! `@context` map. Expansion builds a new tree and leaves its input alone.
//!
//! Expansion is not idempotent: an expanded key such as
//! `https://openminds.om-i.org/props/name` has the prefix `https`, which is
//! normally not a context term, so a second pass prefixes it with `@vocab`
//! again. Expand a document tree at most once per validation pass.
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::node::JsonNode;
use serde_json::{Map, Value};

/// Key carrying the expansion context
pub const CONTEXT_KEY: &str = "@context";
/// Context entry used for keys that match no prefix
pub const VOCAB_KEY: &str = "@vocab";

/// Expand every non-`@` key of `document`
///
/// The effective context is `context` when given and non-empty, otherwise the
/// document's own `@context`. Nested objects inherit the effective context.
/// For each key, if the part before the first `:` names a context entry the
/// key becomes `context[prefix] + key`, otherwise `context["@vocab"] + key`.
/// Keys are left untouched when neither applies. `@context` is dropped from
/// the output.
pub fn expand(document: &Map<String, Value>, context: Option<&Map<String, Value>>) -> Map<String, Value> {
    let own_context = document.get(CONTEXT_KEY).and_then(Value::as_object);
    let effective = match context {
        Some(ctx) if !ctx.is_empty() => Some(ctx),
        _ => own_context,
    };

    let mut expanded = Map::with_capacity(document.len());
    for (key, value) in document {
        if key == CONTEXT_KEY {
            continue;
        }

        let value = expand_value(value, effective);
        if key.starts_with('@') {
            expanded.insert(key.clone(), value);
        } else {
            expanded.insert(expand_key(key, effective), value);
        }
    }
    expanded
}

/// Expand any objects inside `value` under `context`
pub fn expand_value(value: &Value, context: Option<&Map<String, Value>>) -> Value {
    match JsonNode::of(value) {
        JsonNode::Scalar(scalar) => scalar.clone(),
        JsonNode::Object(map) => Value::Object(expand(map, context)),
        JsonNode::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| expand_value(item, context))
                .collect(),
        ),
    }
}

fn expand_key(key: &str, context: Option<&Map<String, Value>>) -> String {
    let Some(context) = context else {
        return key.to_string();
    };

    let prefix = key.split_once(':').map(|(prefix, _)| prefix).unwrap_or(key);
    if let Some(base) = context.get(prefix).and_then(term_iri) {
        return format!("{}{}", base, key);
    }
    match context.get(VOCAB_KEY).and_then(Value::as_str) {
        Some(vocab) => format!("{}{}", vocab, key),
        None => key.to_string(),
    }
}

// A term is either an IRI string or an expanded term definition with `@id`.
fn term_iri(term: &Value) -> Option<&str> {
    match term {
        Value::String(iri) => Some(iri),
        Value::Object(definition) => definition.get("@id").and_then(Value::as_str),
        _ => None,
    }
}

/// Last segment of an IRI after `/` or `#`; the input itself if it has neither
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['/', '#']).next().unwrap_or(iri)
}
