//! In-memory index over the vocabulary `types.json` and `properties.json`
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::jsonld::local_name;
use crate::loader::error::{LoaderError, LoaderResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// A namespace a type is published under, and the versions where it applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub namespace: String,
    #[serde(rename = "inVersions", default)]
    pub in_versions: BTreeSet<String>,
}

/// Vocabulary entry for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Bare type name (`Person`)
    #[serde(default)]
    pub name: String,
    /// Versions the type belongs to
    #[serde(rename = "isPartOfVersion", default)]
    pub versions: BTreeSet<String>,
    /// Namespace per version; at most one binding applies to a given version
    #[serde(rename = "hasNamespace", default)]
    pub namespaces: Vec<NamespaceBinding>,
}

/// Vocabulary entry for one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntry {
    /// Bare property name (`fullName`)
    #[serde(default)]
    pub name: String,
    /// Version to the types (bare names or IRIs) the property is used in
    #[serde(rename = "usedIn", default)]
    pub used_in: HashMap<String, BTreeSet<String>>,
}

/// Index of all known types and properties across versions
///
/// Entries are keyed by bare name; manifest keys given as IRIs are reduced to
/// their local name.
#[derive(Debug, Clone, Default)]
pub struct VocabularyCatalog {
    types: HashMap<String, TypeEntry>,
    properties: HashMap<String, PropertyEntry>,
}

impl VocabularyCatalog {
    /// Build a catalog from parsed entries
    pub fn new(
        types: HashMap<String, TypeEntry>,
        properties: HashMap<String, PropertyEntry>,
    ) -> Self {
        let types = types
            .into_iter()
            .map(|(key, mut entry)| {
                let name = local_name(&key).to_string();
                if entry.name.is_empty() {
                    entry.name = name.clone();
                }
                (name, entry)
            })
            .collect();

        let properties = properties
            .into_iter()
            .map(|(key, mut entry)| {
                let name = local_name(&key).to_string();
                if entry.name.is_empty() {
                    entry.name = name.clone();
                }
                (name, entry)
            })
            .collect();

        Self { types, properties }
    }

    /// Parse a catalog from the raw types and properties documents
    pub fn from_slices(types: &[u8], properties: &[u8]) -> LoaderResult<Self> {
        let types: HashMap<String, TypeEntry> = serde_json::from_slice(types)
            .map_err(|e| LoaderError::catalog_unavailable("types.json", e))?;
        let properties: HashMap<String, PropertyEntry> = serde_json::from_slice(properties)
            .map_err(|e| LoaderError::catalog_unavailable("properties.json", e))?;
        Ok(Self::new(types, properties))
    }

    /// Load a catalog from the two vocabulary files
    pub fn from_files(types_path: &Path, properties_path: &Path) -> LoaderResult<Self> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                LoaderError::catalog_unavailable(path.display().to_string(), e)
            })
        };
        Self::from_slices(&read(types_path)?, &read(properties_path)?)
    }

    /// Whether `type_name` is part of `version`
    pub fn is_type_known_in_version(&self, type_name: &str, version: &str) -> bool {
        self.types
            .get(type_name)
            .map(|entry| entry.versions.contains(version))
            .unwrap_or(false)
    }

    /// Namespace `type_name` is bound to in `version`
    pub fn namespace_for(&self, type_name: &str, version: &str) -> Option<&str> {
        self.types.get(type_name).and_then(|entry| {
            entry
                .namespaces
                .iter()
                .find(|binding| binding.in_versions.contains(version))
                .map(|binding| binding.namespace.as_str())
        })
    }

    /// Whether `property` may be used on `type_ref` in `version`
    ///
    /// `type_ref` may be a bare name or a full type IRI; `usedIn` entries are
    /// matched exactly or by local name.
    pub fn is_property_applicable(&self, property: &str, type_ref: &str, version: &str) -> bool {
        let Some(types) = self
            .properties
            .get(property)
            .and_then(|entry| entry.used_in.get(version))
        else {
            return false;
        };

        let bare = local_name(type_ref);
        types
            .iter()
            .any(|candidate| candidate == type_ref || local_name(candidate) == bare)
    }

    /// Whether `property` exists in any version
    pub fn is_property_known(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Type entry by bare name
    pub fn type_entry(&self, type_name: &str) -> Option<&TypeEntry> {
        self.types.get(type_name)
    }

    /// Number of indexed types and properties
    pub fn counts(&self) -> (usize, usize) {
        (self.types.len(), self.properties.len())
    }
}
