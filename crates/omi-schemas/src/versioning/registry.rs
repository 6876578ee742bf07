//! Version manifest: modules and namespaces per schema version
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::cache::ResolutionCache;
use crate::loader::error::{LoaderError, LoaderResult};
use crate::sources::RemoteSource;
use crate::versioning::version::SchemaVersion;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Sentinel label for the moving "latest" pseudo-version
pub const LATEST: &str = "latest";

/// One module entry of a version: where its schemas live and at which revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Git repository URL
    pub repository: String,
    /// Branch the module tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Commit the module is pinned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl ModuleSpec {
    /// Pinned revision: the commit if present, else the branch
    pub fn pinned_ref(&self) -> Option<&str> {
        self.commit.as_deref().or(self.branch.as_deref())
    }

    /// Whether this module lives at the given repository and branch
    ///
    /// Repository URLs are compared without a trailing `.git` or `/`.
    pub fn matches(&self, repository: &str, branch: &str) -> bool {
        normalize_repository(&self.repository) == normalize_repository(repository)
            && self.branch.as_deref() == Some(branch)
    }
}

/// Modules and namespaces of one version label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// Namespace role (`instances`, `types`, `props`, ...) to base URI
    #[serde(default)]
    pub namespaces: HashMap<String, String>,
    /// Module name to module entry
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSpec>,
}

/// Immutable view over `versions.json`
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
    versions: HashMap<String, VersionSpec>,
}

impl VersionRegistry {
    /// Build a registry from already parsed version specs
    pub fn new(versions: HashMap<String, VersionSpec>) -> Self {
        Self { versions }
    }

    /// Parse a registry from manifest bytes
    pub fn from_slice(content: &[u8]) -> LoaderResult<Self> {
        let versions: HashMap<String, VersionSpec> =
            serde_json::from_slice(content).map_err(LoaderError::manifest_unavailable)?;
        Ok(Self::new(versions))
    }

    /// Load a registry from a manifest file
    pub fn from_file(path: &Path) -> LoaderResult<Self> {
        let content = std::fs::read(path)
            .map_err(|e| LoaderError::manifest_unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_slice(&content)
    }

    /// Whether a version label is defined in the manifest
    pub fn contains(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    /// Full spec of a version
    pub fn get(&self, version: &str) -> Option<&VersionSpec> {
        self.versions.get(version)
    }

    /// Namespace roles of a version
    pub fn namespaces(&self, version: &str) -> Option<&HashMap<String, String>> {
        self.versions.get(version).map(|v| &v.namespaces)
    }

    /// Module entries of a version
    pub fn modules(&self, version: &str) -> Option<&BTreeMap<String, ModuleSpec>> {
        self.versions.get(version).map(|v| &v.modules)
    }

    /// Look up a module by name, accepting the upper-cased spelling too
    pub fn module(&self, version: &str, name: &str) -> Option<&ModuleSpec> {
        let modules = self.modules(version)?;
        modules
            .get(name)
            .or_else(|| modules.get(&name.to_uppercase()))
    }

    /// Version labels: numeric ones in descending order, then non-numeric
    /// labels by name, and `latest` always last
    pub fn ordered_versions(&self) -> Vec<String> {
        let mut labels: Vec<&String> = self.versions.keys().collect();
        labels.sort_by(|a, b| compare_labels(a, b));
        labels.into_iter().cloned().collect()
    }

    /// Branch or commit to use for a module of the `latest` version
    ///
    /// Lists the module repository's branches, keeps those named like
    /// `v<major>[.<minor>[.<patch>]]` and picks the highest by numeric
    /// comparison. The selection is memoised in `cache` per repository.
    pub fn resolve_latest_module_reference(
        &self,
        module: &ModuleSpec,
        remote: &dyn RemoteSource,
        cache: &ResolutionCache,
    ) -> LoaderResult<String> {
        if let Some(branch) = cache.latest_branch(&module.repository) {
            debug!(repository = %module.repository, branch = %branch, "Latest branch cache hit");
            return Ok(branch);
        }

        let branches = remote.list_branches(&module.repository)?;
        let branch = select_latest_branch(&branches)
            .ok_or_else(|| LoaderError::no_version_branch(&module.repository))?;

        info!(repository = %module.repository, branch = %branch, "Resolved latest module branch");
        cache.put_latest_branch(&module.repository, &branch);
        Ok(branch)
    }
}

/// Highest semantic-version branch among `branches`, if any
pub fn select_latest_branch<S: AsRef<str>>(branches: &[S]) -> Option<String> {
    branches
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            SchemaVersion::from_branch_name(name).map(|version| (version, name))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, name)| name.to_string())
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    let rank = |label: &str| -> (u8, Option<SchemaVersion>) {
        if label == LATEST {
            (2, None)
        } else {
            match SchemaVersion::parse(label) {
                Ok(version) => (0, Some(version)),
                Err(_) => (1, None),
            }
        }
    };

    let (rank_a, version_a) = rank(a);
    let (rank_b, version_b) = rank(b);
    rank_a.cmp(&rank_b).then_with(|| match (version_a, version_b) {
        (Some(va), Some(vb)) => vb.cmp(&va).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    })
}

fn normalize_repository(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    trimmed.strip_suffix(".git").unwrap_or(trimmed)
}
