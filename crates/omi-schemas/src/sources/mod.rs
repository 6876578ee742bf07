//! Collaborators the engine talks to at its boundary
//!
//! The engine never performs I/O against remote hosts directly. It goes
//! through these traits so that validators can be exercised against
//! in-memory fakes and so the blocking transport can be swapped out.
//!
//! - [`RemoteSource`]: raw fetches and branch listing
//! - [`ClassDefinitionSource`]: structural class definitions per version
//! - [`SourceCheckout`]: materialising a module repository on disk
//! - [`Manifests`]: downloading the version manifest and vocabulary
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

pub mod checkout;
pub mod classes;
pub mod http;
pub mod manifests;
pub mod process;

pub use checkout::SourceCheckout;
pub use classes::{ClassDefinition, LocalClassDirectory};
pub use http::{HttpRemote, RemoteConfig};
pub use manifests::{ManifestUrls, Manifests};

use crate::loader::error::LoaderResult;

/// Network access needed by the engine
pub trait RemoteSource: Send + Sync {
    /// Fetch a URL; `Ok(None)` means the host reported "not found" (or timed out)
    fn fetch(&self, url: &str) -> LoaderResult<Option<Vec<u8>>>;

    /// Branch names of a repository, in the order the host reports them
    fn list_branches(&self, repository: &str) -> LoaderResult<Vec<String>>;
}

/// Lookup of the structural class definition for a type in a version
pub trait ClassDefinitionSource: Send + Sync {
    /// `None` when no definition exists for the type in that version
    fn class_definition(&self, version: &str, type_name: &str) -> Option<ClassDefinition>;
}

impl<T: RemoteSource + ?Sized> RemoteSource for std::sync::Arc<T> {
    fn fetch(&self, url: &str) -> LoaderResult<Option<Vec<u8>>> {
        (**self).fetch(url)
    }

    fn list_branches(&self, repository: &str) -> LoaderResult<Vec<String>> {
        (**self).list_branches(repository)
    }
}

impl<T: ClassDefinitionSource + ?Sized> ClassDefinitionSource for std::sync::Arc<T> {
    fn class_definition(&self, version: &str, type_name: &str) -> Option<ClassDefinition> {
        (**self).class_definition(version, type_name)
    }
}
