//! Structural class definitions used for required/optional presence checks
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::jsonld::local_name;
use crate::loader::parser::DocumentParser;
use crate::sources::ClassDefinitionSource;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Properties and required properties of one type
///
/// Names are stored as local names so that IRIs (`https://.../props/name`)
/// and bare names (`name`) compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDefinition {
    pub properties: BTreeSet<String>,
    pub required: BTreeSet<String>,
}

impl ClassDefinition {
    /// Build a definition from property and required names
    pub fn new<P, R>(properties: P, required: R) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let required: BTreeSet<String> = required
            .into_iter()
            .map(|name| local_name(name.as_ref()).to_string())
            .collect();
        let mut properties: BTreeSet<String> = properties
            .into_iter()
            .map(|name| local_name(name.as_ref()).to_string())
            .collect();
        properties.extend(required.iter().cloned());
        Self { properties, required }
    }

    /// Read a definition out of a class document
    ///
    /// `properties` may be an object keyed by property name or an array of
    /// names; `required` is an array of names.
    pub fn from_document(document: &Map<String, Value>) -> Self {
        let properties: Vec<String> = match document.get("properties") {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(String::from).collect(),
            _ => Vec::new(),
        };
        let required: Vec<String> = document
            .get("required")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default();
        Self::new(properties, required)
    }

    /// Whether `property` (bare name or IRI) is required
    pub fn is_required(&self, property: &str) -> bool {
        self.required.contains(local_name(property))
    }

    /// Whether `property` is declared but not required
    pub fn is_optional(&self, property: &str) -> bool {
        let name = local_name(property);
        self.properties.contains(name) && !self.required.contains(name)
    }
}

/// Class definitions read from a checkout of the central sources
///
/// Looks for `<root>/schemas/<version>/**/<name>.schema.omi.json`, trying the
/// camel-cased type name first and the type name as given second.
#[derive(Debug, Clone)]
pub struct LocalClassDirectory {
    root: PathBuf,
    parser: DocumentParser,
}

impl LocalClassDirectory {
    /// Create a lookup rooted at a sources checkout
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parser: DocumentParser::new(),
        }
    }

    /// Root of the sources checkout
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn find_file(&self, version: &str, file_name: &str) -> Option<PathBuf> {
        let directory = self.root.join("schemas").join(version);
        WalkDir::new(&directory)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
            .map(|entry| entry.into_path())
    }
}

impl ClassDefinitionSource for LocalClassDirectory {
    fn class_definition(&self, version: &str, type_name: &str) -> Option<ClassDefinition> {
        let camel_case = lower_first(type_name);
        for candidate in [camel_case.as_str(), type_name] {
            let file_name = format!("{}.schema.omi.json", candidate);
            let Some(path) = self.find_file(version, &file_name) else {
                continue;
            };

            let parsed = std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| self.parser.parse_bytes(&content));
            match parsed {
                Ok(document) => {
                    debug!(path = %path.display(), "Loaded class definition");
                    return Some(ClassDefinition::from_document(&document));
                }
                Err(reason) => {
                    warn!(path = %path.display(), "Unreadable class definition: {}", reason);
                    return None;
                }
            }
        }
        None
    }
}

/// `type_name` with its first character lower-cased
pub fn lower_first(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
