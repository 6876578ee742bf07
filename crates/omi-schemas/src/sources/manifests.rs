//! Download of the version manifest and the vocabulary documents
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::sources::RemoteSource;
use crate::versioning::VersionRegistry;
use crate::vocab::VocabularyCatalog;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const VERSIONS_FILE: &str = "versions.json";
pub const TYPES_FILE: &str = "types.json";
pub const PROPERTIES_FILE: &str = "properties.json";

/// Where the three manifest documents are published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUrls {
    pub versions: String,
    pub types: String,
    pub properties: String,
}

impl Default for ManifestUrls {
    fn default() -> Self {
        let raw = "https://raw.githubusercontent.com/openMetadataInitiative/openMINDS/refs/heads";
        Self {
            versions: format!("{}/pipeline/versions.json", raw),
            types: format!("{}/main/vocab/types.json", raw),
            properties: format!("{}/main/vocab/properties.json", raw),
        }
    }
}

/// Local copies of the manifest documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifests {
    pub versions: PathBuf,
    pub types: PathBuf,
    pub properties: PathBuf,
}

impl Manifests {
    /// Manifest paths inside `work_dir`, without downloading anything
    pub fn at(work_dir: &Path) -> Self {
        Self {
            versions: work_dir.join(VERSIONS_FILE),
            types: work_dir.join(TYPES_FILE),
            properties: work_dir.join(PROPERTIES_FILE),
        }
    }

    /// Fetch all three documents into `work_dir`
    ///
    /// A failed or empty fetch keeps whatever copy is already on disk; a
    /// missing copy surfaces later when the registry or catalog is loaded.
    pub fn download(remote: &dyn RemoteSource, urls: &ManifestUrls, work_dir: &Path) -> LoaderResult<Self> {
        std::fs::create_dir_all(work_dir).map_err(|e| {
            LoaderError::manifest_unavailable(format!("{}: {}", work_dir.display(), e))
        })?;

        let manifests = Self::at(work_dir);
        for (url, path) in [
            (&urls.versions, &manifests.versions),
            (&urls.types, &manifests.types),
            (&urls.properties, &manifests.properties),
        ] {
            refresh(remote, url, path);
        }
        Ok(manifests)
    }

    /// Load the version registry
    pub fn registry(&self) -> LoaderResult<VersionRegistry> {
        VersionRegistry::from_file(&self.versions)
    }

    /// Load the vocabulary catalog
    pub fn catalog(&self) -> LoaderResult<VocabularyCatalog> {
        VocabularyCatalog::from_files(&self.types, &self.properties)
    }
}

fn refresh(remote: &dyn RemoteSource, url: &str, path: &Path) {
    let outcome = match remote.fetch(url) {
        Ok(Some(content)) => std::fs::write(path, content).map_err(|e| e.to_string()),
        Ok(None) => Err("not found".to_string()),
        Err(e) => Err(e.to_string()),
    };

    match outcome {
        Ok(()) => info!(url = %url, path = %path.display(), "Downloaded manifest"),
        Err(reason) if path.exists() => {
            warn!(url = %url, path = %path.display(), "Download failed ({}), using cached copy", reason)
        }
        Err(reason) => warn!(url = %url, "Download failed ({}), no cached copy", reason),
    }
}
