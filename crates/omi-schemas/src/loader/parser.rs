//! JSON document parsing for schema templates, instances and manifests
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::{Map, Value};
use std::path::Path;

/// What a parsed document is used for; selects the fatal error reported on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A `*.schema.tpl.json` / `*.schema.omi.json` template
    Schema,
    /// A JSON-LD metadata instance
    Instance,
}

/// Parser for UTF-8 JSON documents whose root must be an object
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a file, requiring a JSON object at the root
    pub fn parse_file(&self, path: &Path, kind: DocumentKind) -> LoaderResult<Map<String, Value>> {
        let content = std::fs::read(path).map_err(|e| Self::unreadable(path, kind, e))?;
        self.parse_bytes(&content)
            .map_err(|reason| Self::unreadable(path, kind, reason))
    }

    /// Parse raw bytes into a JSON object
    ///
    /// The error is a human-readable reason; callers attach path context.
    pub fn parse_bytes(&self, content: &[u8]) -> Result<Map<String, Value>, String> {
        let value: Value = serde_json::from_slice(content).map_err(|e| e.to_string())?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(format!(
                "expected a JSON object at the document root, found {}",
                json_kind(&other)
            )),
        }
    }

    fn unreadable(path: &Path, kind: DocumentKind, reason: impl ToString) -> LoaderError {
        match kind {
            DocumentKind::Schema => LoaderError::schema_unreadable(path, reason),
            DocumentKind::Instance => LoaderError::instance_unreadable(path, reason),
        }
    }
}

/// Short name of a JSON value's shape, for messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_object_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("person.schema.tpl.json");
        fs::write(&path, r#"{"_type": "Person", "properties": {}}"#).unwrap();

        let doc = DocumentParser::new()
            .parse_file(&path, DocumentKind::Schema)
            .unwrap();
        assert_eq!(doc["_type"], "Person");
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let err = DocumentParser::new().parse_bytes(b"[1, 2]").unwrap_err();
        assert!(err.contains("found array"));
    }

    #[test]
    fn test_error_kind_follows_document_kind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jsonld");
        fs::write(&path, "{ not json").unwrap();

        let parser = DocumentParser::new();
        assert!(matches!(
            parser.parse_file(&path, DocumentKind::Instance),
            Err(LoaderError::InstanceUnreadable { .. })
        ));
        assert!(matches!(
            parser.parse_file(&dir.path().join("missing.json"), DocumentKind::Schema),
            Err(LoaderError::SchemaUnreadable { .. })
        ));
    }
}
