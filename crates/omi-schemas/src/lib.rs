//! omi-schemas - validation and resolution engine for openMINDS metadata
//!
//! This crate validates two kinds of JSON-LD documents against a versioned
//! vocabulary:
//! - **Schema templates**: `_type` casing, `_extends` targets and required
//!   properties inherited along the `_extends` chain, which may cross into
//!   other module repositories pinned to a commit or to the latest version
//!   branch
//! - **Instances**: identifier conventions, type and namespace consistency,
//!   property applicability per enclosing type and required/optional presence
//!
//! ## Features
//!
//! - **Version Registry**: modules and namespaces per version, with numeric
//!   "latest" branch discovery
//! - **Vocabulary Catalog**: types and properties known per version
//! - **JSON-LD Expansion**: compact keys expanded once per validation pass
//! - **Resolution Cache**: thread-safe, shared by all validators of a run
//! - **Findings**: every problem is reported with a JSON path, document id
//!   and version instead of aborting on the first one
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use omi_schemas::sources::{LocalClassDirectory, Manifests};
//! use omi_schemas::validation::{DocumentValidator, InstanceValidator};
//! use std::path::Path;
//!
//! let manifests = Manifests::at(Path::new(".omi-validate"));
//! let registry = manifests.registry()?;
//! let catalog = manifests.catalog()?;
//! let classes = LocalClassDirectory::new("sources");
//!
//! let validator = InstanceValidator::new(
//!     "instances/latest/licenses/mit.jsonld",
//!     &catalog,
//!     &registry,
//!     &classes,
//! );
//! for finding in validator.validate()?.iter() {
//!     println!("{}", finding);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

pub mod jsonld;
pub mod loader;
pub mod node;
pub mod sources;
pub mod validation;
pub mod versioning;
pub mod vocab;

// Re-export commonly used types for convenience
pub use loader::{
    CallerRepository, LoaderError, LoaderResult, ResolutionCache, ResolverConfig, SchemaResolver,
};
pub use sources::{ClassDefinitionSource, RemoteSource};
pub use validation::{
    DocumentReport, DocumentValidator, Finding, FindingCode, Findings, InstanceValidator,
    SchemaValidator, Severity,
};
pub use versioning::{SchemaVersion, VersionRegistry, LATEST};
pub use vocab::VocabularyCatalog;
