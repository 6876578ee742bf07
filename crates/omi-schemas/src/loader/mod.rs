//! Document loading and `_extends` resolution
//!
//! This module provides:
//! - JSON parsing of schema templates, instances and manifests
//! - Resolution of `_extends` references, locally or from module repositories
//! - A thread-safe resolution cache shared by all validators of a run
//! - Circular `_extends` detection
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use omi_schemas::loader::{ResolutionCache, ResolverConfig, SchemaResolver};
//! use omi_schemas::sources::{HttpRemote, RemoteConfig};
//! use omi_schemas::versioning::VersionRegistry;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(VersionRegistry::from_file(Path::new("versions.json"))?);
//! let remote = Arc::new(HttpRemote::new(RemoteConfig::default())?);
//! let resolver = SchemaResolver::new(
//!     registry,
//!     remote,
//!     Arc::new(ResolutionCache::new()),
//!     ResolverConfig::new("schemas"),
//! );
//! let parent = resolver.resolve("/core/schemas/products/researchProduct.schema.tpl.json")?;
//! println!("{:?}", parent.binding);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod parser;
pub mod resolver;

pub use cache::{CacheEntry, CacheStats, ResolutionCache};
pub use error::{LoaderError, LoaderResult};
pub use parser::{DocumentKind, DocumentParser};
pub use resolver::{
    Binding, CallerRepository, ChainEnd, ExtendsChain, ResolvedSchema, ResolverConfig,
    SchemaResolver, EXTENDS_KEY,
};
