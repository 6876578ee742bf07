//! Schema template validation
//!
//! Runs three checks over one `*.schema.tpl.json` document, all of them
//! unconditionally:
//! - `_type` casing
//! - `_extends` target existence
//! - `required` names defined locally or somewhere up the `_extends` chain
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::parser::{DocumentKind, DocumentParser};
use crate::loader::resolver::{defines_property, ChainEnd, SchemaResolver, EXTENDS_KEY};
use crate::loader::LoaderResult;
use crate::validation::base::{DocumentValidator, ValidationContext};
use crate::validation::error::{FindingCode, Findings};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validator for a single schema template
pub struct SchemaValidator<'a> {
    path: PathBuf,
    resolver: &'a SchemaResolver,
}

impl<'a> SchemaValidator<'a> {
    /// Validator for the schema at `path`, resolving `_extends` through `resolver`
    pub fn new(path: impl Into<PathBuf>, resolver: &'a SchemaResolver) -> Self {
        Self {
            path: path.into(),
            resolver,
        }
    }

    /// Path of the schema being validated
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check an already parsed schema document
    pub fn check_document(&self, schema: &Map<String, Value>) -> Findings {
        let identity = schema
            .get("_type")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.path.display().to_string());
        let context = ValidationContext::new().with_document(identity);

        let mut findings = Findings::new();
        self.check_type_casing(schema, &context, &mut findings);
        self.check_extends(schema, &context, &mut findings);
        self.check_required(schema, &context, &mut findings);
        findings
    }

    fn check_type_casing(&self, schema: &Map<String, Value>, context: &ValidationContext, findings: &mut Findings) {
        let Some(value) = schema.get("_type") else {
            return;
        };
        let context = context.child("_type");

        match value.as_str() {
            Some(type_name) if is_valid_type_casing(type_name) => {}
            Some(type_name) => findings.add(context.finding(
                FindingCode::InvalidTypeCasing,
                format!(
                    "first character of type \"{}\" should be uppercase",
                    trailing_type_segment(type_name)
                ),
            )),
            None => findings.add(context.finding(
                FindingCode::InvalidTypeCasing,
                "_type must be a string",
            )),
        }
    }

    fn check_extends(&self, schema: &Map<String, Value>, context: &ValidationContext, findings: &mut Findings) {
        let Some(value) = schema.get(EXTENDS_KEY) else {
            return;
        };
        let context = context.child(EXTENDS_KEY);

        let Some(reference) = value.as_str() else {
            findings.add(context.finding(FindingCode::MissingExtendsTarget, "_extends must be a string"));
            return;
        };

        if let Err(err) = self.resolver.resolve(reference) {
            findings.add(context.finding(
                FindingCode::MissingExtendsTarget,
                format!("cannot resolve \"{}\": {}", reference, err),
            ));
        }
    }

    fn check_required(&self, schema: &Map<String, Value>, context: &ValidationContext, findings: &mut Findings) {
        let Some(required) = schema.get("required").and_then(Value::as_array) else {
            return;
        };

        let mut seen = HashSet::new();
        let missing: Vec<(usize, &str)> = required
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| name.as_str().map(|name| (idx, name)))
            .filter(|(_, name)| seen.insert(*name))
            .filter(|(_, name)| !defines_property(schema, name))
            .collect();
        if missing.is_empty() {
            return;
        }

        let chain = schema
            .get(EXTENDS_KEY)
            .and_then(Value::as_str)
            .map(|reference| self.resolver.resolve_chain(reference, None));
        if let Some(chain) = &chain {
            if let ChainEnd::Unresolved(err) | ChainEnd::Circular(err) = &chain.end {
                debug!(error = %err, "Required property walk ended early");
            }
        }

        for (idx, name) in missing {
            let inherited = chain
                .as_ref()
                .and_then(|chain| chain.defining_ancestor(name))
                .is_some();
            if !inherited {
                findings.add(context.child("required").child_index(idx).finding(
                    FindingCode::MissingRequiredProperty,
                    format!("missing required property \"{}\"", name),
                ));
            }
        }
    }
}

impl DocumentValidator for SchemaValidator<'_> {
    fn validate(&self) -> LoaderResult<Findings> {
        let schema = DocumentParser::new().parse_file(&self.path, DocumentKind::Schema)?;
        debug!(path = %self.path.display(), "Validating schema");
        Ok(self.check_document(&schema))
    }
}

/// Segment of a type name after the last `:` or `/`
pub fn trailing_type_segment(type_name: &str) -> &str {
    type_name.rsplit([':', '/']).next().unwrap_or(type_name)
}

/// Whether the trailing segment of `type_name` starts with an uppercase character
pub fn is_valid_type_casing(type_name: &str) -> bool {
    trailing_type_segment(type_name)
        .chars()
        .next()
        .map(char::is_uppercase)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ResolutionCache, ResolverConfig};
    use crate::sources::RemoteSource;
    use crate::versioning::VersionRegistry;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct Offline;

    impl RemoteSource for Offline {
        fn fetch(&self, _url: &str) -> LoaderResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn list_branches(&self, _repository: &str) -> LoaderResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn resolver(root: &Path) -> SchemaResolver {
        SchemaResolver::new(
            Arc::new(VersionRegistry::default()),
            Arc::new(Offline),
            Arc::new(ResolutionCache::new()),
            ResolverConfig::new(root),
        )
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_type_casing() {
        assert!(is_valid_type_casing("https://openminds.om-i.org/types/Person"));
        assert!(is_valid_type_casing("core:Person"));
        assert!(!is_valid_type_casing("core:person"));
        assert!(!is_valid_type_casing("https://x/types/"));
        assert_eq!(trailing_type_segment("a:b/C"), "C");
    }

    #[test]
    fn test_lowercase_type_is_reported() {
        let dir = tempdir().unwrap();
        let resolver = resolver(dir.path());
        let validator = SchemaValidator::new(dir.path().join("x.json"), &resolver);

        let findings = validator.check_document(&obj(json!({"_type": "https://x/types/person"})));
        assert_eq!(findings.len(), 1);
        assert!(findings.contains(FindingCode::InvalidTypeCasing));
    }

    #[test]
    fn test_required_inherited_from_local_parent() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("parent.schema.tpl.json"),
            r#"{"properties": {"name": {}}}"#,
        )
        .unwrap();

        let resolver = resolver(dir.path());
        let validator = SchemaValidator::new(dir.path().join("child.json"), &resolver);
        let findings = validator.check_document(&obj(json!({
            "_type": "https://x/types/Child",
            "_extends": "parent.schema.tpl.json",
            "required": ["name", "age", "age"],
            "properties": {}
        })));

        let missing = findings.with_code(FindingCode::MissingRequiredProperty);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path, "$.required[1]");
        assert!(!findings.contains(FindingCode::MissingExtendsTarget));
    }

    #[test]
    fn test_missing_extends_target_and_required() {
        let dir = tempdir().unwrap();
        let resolver = resolver(dir.path());
        let validator = SchemaValidator::new(dir.path().join("child.json"), &resolver);
        let findings = validator.check_document(&obj(json!({
            "_extends": "nowhere.schema.tpl.json",
            "required": ["name"],
            "properties": {}
        })));

        assert!(findings.contains(FindingCode::MissingExtendsTarget));
        assert_eq!(findings.with_code(FindingCode::MissingRequiredProperty).len(), 1);
    }

    #[test]
    fn test_unreadable_schema_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let resolver = resolver(dir.path());
        let validator = SchemaValidator::new(&path, &resolver);
        assert!(matches!(
            validator.validate(),
            Err(crate::loader::LoaderError::SchemaUnreadable { .. })
        ));
    }
}
