//! Shared fixtures for integration tests: in-memory collaborators and a
//! small vocabulary.

#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use omi_schemas::sources::ClassDefinition;
use omi_schemas::{ClassDefinitionSource, LoaderResult, RemoteSource, VersionRegistry, VocabularyCatalog};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

pub const CORE_REPO: &str = "https://github.com/openMetadataInitiative/openMINDS_core.git";
pub const INSTANCES: &str = "https://openminds.om-i.org/instances/";
pub const TYPES: &str = "https://openminds.om-i.org/types/";

/// Remote host serving fixed documents and branch lists
#[derive(Default)]
pub struct FakeRemote {
    pub files: HashMap<String, Vec<u8>>,
    pub branches: HashMap<String, Vec<String>>,
    pub fetches: Mutex<Vec<String>>,
    pub listings: Mutex<usize>,
}

impl FakeRemote {
    /// Serve `document` at `url` wrapped like a content API response
    pub fn with_content(mut self, url: impl Into<String>, document: Value) -> Self {
        let encoded = general_purpose::STANDARD.encode(document.to_string());
        let body = json!({"type": "file", "encoding": "base64", "content": encoded});
        self.files.insert(url.into(), body.to_string().into_bytes());
        self
    }

    pub fn with_branches(mut self, repository: &str, branches: &[&str]) -> Self {
        self.branches.insert(
            repository.to_string(),
            branches.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl RemoteSource for FakeRemote {
    fn fetch(&self, url: &str) -> LoaderResult<Option<Vec<u8>>> {
        self.fetches.lock().unwrap().push(url.to_string());
        Ok(self.files.get(url).cloned())
    }

    fn list_branches(&self, repository: &str) -> LoaderResult<Vec<String>> {
        *self.listings.lock().unwrap() += 1;
        Ok(self.branches.get(repository).cloned().unwrap_or_default())
    }
}

/// Class definitions keyed by type name, identical for every version
#[derive(Default)]
pub struct FakeClasses(pub HashMap<String, ClassDefinition>);

impl ClassDefinitionSource for FakeClasses {
    fn class_definition(&self, _version: &str, type_name: &str) -> Option<ClassDefinition> {
        self.0.get(type_name).cloned()
    }
}

/// Content API URL of a core module file
pub fn core_url(path: &str, git_ref: &str) -> String {
    format!(
        "https://api.github.com/repos/openMetadataInitiative/openMINDS_core/contents/{}?ref={}",
        path, git_ref
    )
}

pub fn registry() -> VersionRegistry {
    let manifest = json!({
        "v3.0": {
            "namespaces": {"instances": "https://openminds.ebrains.eu/instances/"},
            "modules": {"core": {"repository": CORE_REPO, "branch": "v3", "commit": "3333333"}}
        },
        "latest": {
            "namespaces": {"instances": INSTANCES},
            "modules": {"core": {"repository": CORE_REPO, "branch": "main"}}
        }
    });
    VersionRegistry::from_slice(manifest.to_string().as_bytes()).unwrap()
}

pub fn catalog() -> VocabularyCatalog {
    let types = json!({
        format!("{}License", TYPES): {
            "isPartOfVersion": ["latest"],
            "hasNamespace": [{"namespace": TYPES, "inVersions": ["latest"]}]
        },
        format!("{}Dataset", TYPES): {
            "isPartOfVersion": ["latest"],
            "hasNamespace": [{"namespace": TYPES, "inVersions": ["latest"]}]
        }
    });
    let properties = json!({
        "title": {"usedIn": {"latest": [format!("{}License", TYPES)]}},
        "shortName": {"usedIn": {"latest": [format!("{}License", TYPES), format!("{}Dataset", TYPES)]}},
        "fullName": {"usedIn": {"latest": [format!("{}Dataset", TYPES)]}}
    });
    VocabularyCatalog::from_slices(types.to_string().as_bytes(), properties.to_string().as_bytes()).unwrap()
}
