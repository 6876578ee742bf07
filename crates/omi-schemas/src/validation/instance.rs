//! Instance document validation
//!
//! Five independent checks run over one JSON-LD instance:
//! 1. `@id` and `@type` are present (otherwise nothing else runs)
//! 2. identifier conventions: file name, whitespace, segment count
//! 3. type known for the version, namespace and `@id` folder consistent
//! 4. every property known and applicable to its enclosing type
//! 5. required properties present and non-empty, per class definition
//!
//! The document is expanded once and the expanded tree is shared by checks 4
//! and 5.
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::jsonld::{self, local_name};
use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::parser::{DocumentKind, DocumentParser};
use crate::node::{is_blank, is_blank_string, JsonNode};
use crate::sources::classes::lower_first;
use crate::sources::ClassDefinitionSource;
use crate::validation::base::{DocumentValidator, ValidationContext};
use crate::validation::error::{FindingCode, Findings};
use crate::versioning::VersionRegistry;
use crate::vocab::VocabularyCatalog;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const ID_KEY: &str = "@id";
const TYPE_KEY: &str = "@type";

/// Validator for a single instance file
pub struct InstanceValidator<'a> {
    path: PathBuf,
    catalog: &'a VocabularyCatalog,
    registry: &'a VersionRegistry,
    classes: &'a dyn ClassDefinitionSource,
    version_override: Option<String>,
}

impl<'a> InstanceValidator<'a> {
    /// Validator for the instance at `path`
    pub fn new(
        path: impl Into<PathBuf>,
        catalog: &'a VocabularyCatalog,
        registry: &'a VersionRegistry,
        classes: &'a dyn ClassDefinitionSource,
    ) -> Self {
        Self {
            path: path.into(),
            catalog,
            registry,
            classes,
            version_override: None,
        }
    }

    /// Validate against `version` instead of the one implied by the path
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version_override = Some(version.into());
        self
    }

    /// Path of the instance being validated
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version the instance is validated against
    ///
    /// An explicit override wins; otherwise the first path component naming a
    /// version of the registry.
    pub fn version(&self) -> LoaderResult<String> {
        if let Some(version) = &self.version_override {
            if self.registry.contains(version) {
                return Ok(version.clone());
            }
            return Err(LoaderError::version_unknown(version, &self.path));
        }

        self.path
            .components()
            .filter_map(|component| component.as_os_str().to_str())
            .find(|component| self.registry.contains(component))
            .map(str::to_string)
            .ok_or_else(|| LoaderError::version_unknown("<none>", &self.path))
    }

    /// Check an already parsed instance against `version`
    pub fn check_document(&self, instance: &Map<String, Value>, version: &str) -> Findings {
        let mut findings = Findings::new();

        let (Some(id), Some(type_iri)) = (instance.get(ID_KEY).and_then(Value::as_str), type_value(instance)) else {
            let message = if instance.contains_key(ID_KEY) && instance.contains_key(TYPE_KEY) {
                "'@id' must be a string and '@type' a string or a single-element array"
            } else {
                "instance must contain both '@id' and '@type'"
            };
            let context = ValidationContext::new().with_version(version);
            findings.add(context.finding(FindingCode::MissingIdentityFields, message));
            return findings;
        };

        let context = ValidationContext::new().with_document(id).with_version(version);
        let instances_ns = self
            .registry
            .namespaces(version)
            .and_then(|namespaces| namespaces.get("instances"))
            .map(String::as_str);

        self.check_naming(instance, id, instances_ns, &context, &mut findings);
        self.check_type(id, type_iri, version, instances_ns, &context, &mut findings);

        let expanded = jsonld::expand(instance, None);
        self.check_properties(&expanded, type_iri, version, &context, &mut findings);

        let mut unavailable = HashSet::new();
        self.check_presence(&expanded, type_name(type_iri), version, &context, &mut unavailable, &mut findings);

        findings
    }

    fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn check_naming(
        &self,
        instance: &Map<String, Value>,
        id: &str,
        instances_ns: Option<&str>,
        context: &ValidationContext,
        findings: &mut Findings,
    ) {
        let file_stem = self.file_stem();
        let id_name = id.rsplit('/').next().unwrap_or(id);
        if id_name != file_stem {
            findings.add(context.child(ID_KEY).finding(
                FindingCode::FileNameMismatch,
                format!("@id entity \"{}\" does not match the file name \"{}\"", id_name, file_stem),
            ));
        }

        check_ids(instance, instances_ns, context, findings);
    }

    fn check_type(
        &self,
        id: &str,
        type_iri: &str,
        version: &str,
        instances_ns: Option<&str>,
        context: &ValidationContext,
        findings: &mut Findings,
    ) {
        let type_context = context.child(TYPE_KEY);
        let name = type_name(type_iri);

        if !self.catalog.is_type_known_in_version(name, version) {
            findings.add(type_context.finding(
                FindingCode::UnknownType,
                format!("type \"{}\" not found for version \"{}\"", name, version),
            ));
        } else if let Some(namespace) = self.catalog.namespace_for(name, version) {
            let expected = format!("{}{}", namespace, name);
            if expected != type_iri {
                findings.add(type_context.finding(
                    FindingCode::NamespaceMismatch,
                    format!("malformed @type \"{}\", expected \"{}\"", type_iri, expected),
                ));
            }
        }

        let folder = expected_folder(name);
        let id_folder = parent_folder(id);
        let outside_namespace = instances_ns.is_some_and(|ns| !id.starts_with(ns));
        if id_folder != Some(folder.as_str()) || outside_namespace {
            findings.add(context.child(ID_KEY).finding(
                FindingCode::IdTypeMismatch,
                format!(
                    "mismatch between @id \"{}\" and @type \"{}\", expected {}{}/…",
                    id,
                    type_iri,
                    instances_ns.unwrap_or(""),
                    folder
                ),
            ));
        }
    }

    fn check_properties(
        &self,
        node: &Map<String, Value>,
        enclosing_type: &str,
        version: &str,
        context: &ValidationContext,
        findings: &mut Findings,
    ) {
        for (key, value) in node {
            if key.starts_with('@') {
                continue;
            }
            let property = local_name(key);
            let property_context = context.child(property);

            if !self.catalog.is_property_known(property) {
                findings.add(property_context.finding(
                    FindingCode::UnknownProperty,
                    format!("unknown property \"{}\"", property),
                ));
            } else if !self.catalog.is_property_applicable(property, enclosing_type, version) {
                findings.add(property_context.finding(
                    FindingCode::PropertyNotApplicable,
                    format!(
                        "property \"{}\" not available for type \"{}\" in version {}",
                        property, enclosing_type, version
                    ),
                ));
            }

            for (idx, child) in JsonNode::of(value).objects() {
                let child_type = type_value(child).unwrap_or(enclosing_type);
                self.check_properties(child, child_type, version, &property_context.child_item(idx), findings);
            }
        }
    }

    fn check_presence(
        &self,
        node: &Map<String, Value>,
        type_name: &str,
        version: &str,
        context: &ValidationContext,
        unavailable: &mut HashSet<String>,
        findings: &mut Findings,
    ) {
        match self.classes.class_definition(version, type_name) {
            Some(definition) => {
                for required in &definition.required {
                    let value = node
                        .iter()
                        .find(|(key, _)| !key.starts_with('@') && local_name(key) == required)
                        .map(|(_, value)| value);
                    match value {
                        None => findings.add(context.child(required).finding(
                            FindingCode::MissingRequiredProperty,
                            format!("missing required property \"{}\" for type \"{}\"", required, type_name),
                        )),
                        Some(value) if is_blank(value) => findings.add(context.child(required).finding(
                            FindingCode::EmptyRequiredValue,
                            format!("required property \"{}\" is empty", required),
                        )),
                        Some(_) => {}
                    }
                }

                for (key, value) in node.iter().filter(|(key, _)| !key.starts_with('@')) {
                    let property = local_name(key);
                    if definition.is_optional(property) && is_blank_string(value) {
                        findings.add(context.child(property).finding(
                            FindingCode::SuspiciousEmptyOptional,
                            format!("optional property \"{}\" is present but empty", property),
                        ));
                    }
                }
            }
            None => {
                if unavailable.insert(type_name.to_string()) {
                    findings.add(context.finding(
                        FindingCode::ClassDefinitionUnavailable,
                        format!("no class definition for \"{}\" in version {}", type_name, version),
                    ));
                }
            }
        }

        // Only embedded objects carrying their own @type are records; bare
        // {"@id": ...} objects are links.
        for (key, value) in node.iter().filter(|(key, _)| !key.starts_with('@')) {
            for (idx, child) in JsonNode::of(value).objects() {
                if let Some(child_type) = type_value(child) {
                    let child_context = context.child(local_name(key)).child_item(idx);
                    self.check_presence(child, self::type_name(child_type), version, &child_context, unavailable, findings);
                }
            }
        }
    }
}

impl DocumentValidator for InstanceValidator<'_> {
    fn validate(&self) -> LoaderResult<Findings> {
        let instance = DocumentParser::new().parse_file(&self.path, DocumentKind::Instance)?;
        let version = self.version()?;
        debug!(path = %self.path.display(), version = %version, "Validating instance");
        Ok(self.check_document(&instance, &version))
    }
}

// Whitespace and segment-count checks for every @id in the tree.
fn check_ids(
    node: &Map<String, Value>,
    instances_ns: Option<&str>,
    context: &ValidationContext,
    findings: &mut Findings,
) {
    if let Some(id) = node.get(ID_KEY).and_then(Value::as_str) {
        let id_context = context.child(ID_KEY);
        if id.chars().any(char::is_whitespace) {
            findings.add(id_context.finding(
                FindingCode::IdWhitespace,
                format!("white space detected in @id \"{}\"", id),
            ));
        }

        if let Some(ns) = instances_ns.filter(|ns| id.starts_with(*ns)) {
            let expected = segment_count(ns) + 2;
            let actual = segment_count(id);
            if actual != expected {
                findings.add(id_context.finding(
                    FindingCode::IdSegmentCountMismatch,
                    format!("@id \"{}\" has {} path segments, expected {}", id, actual, expected),
                ));
            }
        }
    }

    for (key, value) in node.iter().filter(|(key, _)| !key.starts_with('@')) {
        for (idx, child) in JsonNode::of(value).objects() {
            check_ids(child, instances_ns, &context.child(key).child_item(idx), findings);
        }
    }
}

/// `@type` of a node; a single-element array counts as its only entry
fn type_value(node: &Map<String, Value>) -> Option<&str> {
    match node.get(TYPE_KEY)? {
        Value::String(type_iri) => Some(type_iri),
        Value::Array(items) if items.len() == 1 => items[0].as_str(),
        _ => None,
    }
}

/// Bare type name: the segment of `@type` after the last `/`
pub fn type_name(type_iri: &str) -> &str {
    type_iri.rsplit('/').next().unwrap_or(type_iri)
}

/// Folder under the instances namespace that holds instances of `type_name`
pub fn expected_folder(type_name: &str) -> String {
    match type_name {
        "License" => "licenses".to_string(),
        "ContentType" => "contentTypes".to_string(),
        other => lower_first(other),
    }
}

/// Second-to-last `/` segment of an `@id`
pub fn parent_folder(id: &str) -> Option<&str> {
    let mut segments = id.rsplit('/');
    segments.next()?;
    segments.next()
}

fn segment_count(iri: &str) -> usize {
    iri.split('/').filter(|segment| !segment.is_empty()).count()
}
