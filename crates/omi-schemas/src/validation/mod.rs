//! Schema template and instance validation
//!
//! Validators accumulate [`Finding`]s instead of stopping at the first
//! problem. Only fatal preconditions (unreadable document, unknown version)
//! are returned as errors.
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod instance;
pub mod schema;

pub use base::{DocumentValidator, ValidationContext};
pub use error::{Finding, FindingCode, Findings, Severity};
pub use instance::{expected_folder, InstanceValidator};
pub use schema::{is_valid_type_casing, SchemaValidator};

use crate::loader::LoaderError;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of validating one document
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub findings: Findings,
    /// Fatal error that stopped validation of this document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
}

impl DocumentReport {
    /// Run `validator` and capture its findings or its fatal error
    pub fn run(path: impl Into<PathBuf>, validator: &dyn DocumentValidator) -> Self {
        let path = path.into();
        match validator.validate() {
            Ok(findings) => Self {
                path,
                findings,
                fatal: None,
            },
            Err(err) => Self::fatal(path, &err),
        }
    }

    /// Report for a document whose validation aborted
    pub fn fatal(path: impl Into<PathBuf>, err: &LoaderError) -> Self {
        Self {
            path: path.into(),
            findings: Findings::new(),
            fatal: Some(err.to_string()),
        }
    }

    /// Whether the document failed: a fatal error or any error finding
    pub fn failed(&self) -> bool {
        self.fatal.is_some() || self.findings.has_errors()
    }
}
