//! Base validation trait and path context
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::LoaderResult;
use crate::validation::error::{Finding, FindingCode, Findings};

/// Location inside the document being validated, plus the document identity
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Current JSON path
    pub path: String,
    /// `@id` of the instance or `_type` of the schema
    pub document: Option<String>,
    /// Schema version the document is checked against
    pub version: Option<String>,
}

impl ValidationContext {
    /// Create a root context
    pub fn new() -> Self {
        Self {
            path: "$".to_string(),
            document: None,
            version: None,
        }
    }

    /// Set the document identity
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Create a child context with updated path
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
            document: self.document.clone(),
            version: self.version.clone(),
        }
    }

    /// Create a child context for array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            document: self.document.clone(),
            version: self.version.clone(),
        }
    }

    /// Child context for an optional array index
    pub fn child_item(&self, index: Option<usize>) -> Self {
        match index {
            Some(idx) => self.child_index(idx),
            None => self.clone(),
        }
    }

    /// Build a finding at this location, carrying the document identity
    pub fn finding(&self, code: FindingCode, message: impl Into<String>) -> Finding {
        let mut finding = Finding::new(code, self.path.clone(), message);
        finding.document = self.document.clone();
        finding.version = self.version.clone();
        finding
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A validator bound to one document
///
/// `validate` fails only on fatal preconditions (the document cannot be
/// loaded, a manifest is unavailable); every other problem is returned as a
/// finding.
pub trait DocumentValidator {
    /// Run every check and return all findings
    fn validate(&self) -> LoaderResult<Findings>;
}
