//! Vocabulary catalog of types and properties per schema version
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

pub mod catalog;

pub use catalog::{NamespaceBinding, PropertyEntry, TypeEntry, VocabularyCatalog};
