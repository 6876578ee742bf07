//! Error types for loading and resolving documents
//!
//! These are the fatal and structural failures of the engine. Conformance
//! problems are never reported through this type; they accumulate as
//! [`Finding`](crate::validation::Finding)s instead.
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Failures raised while loading manifests, documents and remote schemas
#[derive(Error, Debug)]
pub enum LoaderError {
    /// A schema document could not be read or parsed
    #[error("Failed to load schema '{path}': {reason}")]
    SchemaUnreadable { path: PathBuf, reason: String },

    /// An instance document could not be read or parsed
    #[error("Failed to load instance '{path}': {reason}")]
    InstanceUnreadable { path: PathBuf, reason: String },

    /// types.json or properties.json is missing or malformed
    #[error("Vocabulary catalog unavailable ({source_name}): {reason}")]
    CatalogUnavailable { source_name: String, reason: String },

    /// versions.json is missing or malformed
    #[error("Version manifest unavailable: {reason}")]
    ManifestUnavailable { reason: String },

    /// The remote host answered "not found" (or timed out) for a schema
    #[error("Schema '{reference}' not found at {location}")]
    SchemaNotFound { reference: String, location: String },

    /// No module entry matches the module segment of an absolute reference
    #[error("Module '{module}' referenced by '{reference}' is not defined for version '{version}'")]
    ModuleUnresolvable {
        reference: String,
        module: String,
        version: String,
    },

    /// No branch of the repository looks like a semantic version
    #[error("No version branch (v<major>[.<minor>[.<patch>]]) found in '{repository}'")]
    NoVersionBranch { repository: String },

    /// An `_extends` chain loops back onto itself or exceeds the depth limit
    #[error("Circular _extends chain: {chain}")]
    CircularExtends { chain: String },

    /// The version of an instance could not be determined or is not in the manifest
    #[error("Unknown version '{version}' for '{path}'")]
    VersionUnknown { version: String, path: PathBuf },

    /// Transport level failure while talking to a remote host
    #[error("Remote request to '{url}' failed: {reason}")]
    Remote { url: String, reason: String },
}

impl LoaderError {
    /// Create a schema-unreadable error
    pub fn schema_unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SchemaUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an instance-unreadable error
    pub fn instance_unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InstanceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a catalog-unavailable error
    pub fn catalog_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::CatalogUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a manifest-unavailable error
    pub fn manifest_unavailable(reason: impl ToString) -> Self {
        Self::ManifestUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Create a schema-not-found error
    pub fn schema_not_found(reference: impl Into<String>, location: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            reference: reference.into(),
            location: location.into(),
        }
    }

    /// Create a module-unresolvable error
    pub fn module_unresolvable(
        reference: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::ModuleUnresolvable {
            reference: reference.into(),
            module: module.into(),
            version: version.into(),
        }
    }

    /// Create a no-version-branch error
    pub fn no_version_branch(repository: impl Into<String>) -> Self {
        Self::NoVersionBranch {
            repository: repository.into(),
        }
    }

    /// Create a circular reference error from the visited chain
    pub fn circular_extends(chain: &[String]) -> Self {
        Self::CircularExtends {
            chain: chain.join(" -> "),
        }
    }

    /// Create a version-unknown error
    pub fn version_unknown(version: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::VersionUnknown {
            version: version.into(),
            path: path.into(),
        }
    }

    /// Create a remote transport error
    pub fn remote(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Remote {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts validation of the current document
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SchemaUnreadable { .. }
                | Self::InstanceUnreadable { .. }
                | Self::CatalogUnavailable { .. }
                | Self::ManifestUnavailable { .. }
                | Self::VersionUnknown { .. }
        )
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::SchemaUnreadable { path, .. } => Some(path),
            Self::InstanceUnreadable { path, .. } => Some(path),
            Self::VersionUnknown { path, .. } => Some(path),
            _ => None,
        }
    }
}
