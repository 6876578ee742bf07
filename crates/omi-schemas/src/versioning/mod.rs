//! Schema version handling
//!
//! This module provides:
//! - Semantic version parsing of version labels and branch names
//! - The version manifest (`versions.json`) with its modules and namespaces
//! - Deterministic ordering of version labels and "latest" branch discovery
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

pub mod registry;
pub mod version;

pub use registry::{select_latest_branch, ModuleSpec, VersionRegistry, VersionSpec, LATEST};
pub use version::{SchemaVersion, VersionError};
