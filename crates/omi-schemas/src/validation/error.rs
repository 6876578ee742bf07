//! Validation findings for schema templates and instances
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only; never fails a run
    Warning,
    /// Structural or conformance problem; fails the run
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCode {
    // schema templates
    InvalidTypeCasing,
    MissingExtendsTarget,
    MissingRequiredProperty,
    // instance identity and naming
    MissingIdentityFields,
    IdWhitespace,
    IdSegmentCountMismatch,
    FileNameMismatch,
    // instance type and namespace
    UnknownType,
    NamespaceMismatch,
    IdTypeMismatch,
    // instance properties
    UnknownProperty,
    PropertyNotApplicable,
    EmptyRequiredValue,
    SuspiciousEmptyOptional,
    ClassDefinitionUnavailable,
}

impl FindingCode {
    /// Severity a finding with this code is reported at
    pub fn severity(self) -> Severity {
        match self {
            FindingCode::SuspiciousEmptyOptional | FindingCode::ClassDefinitionUnavailable => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One problem found in a document, with enough context to locate it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    /// JSON path of the offending field (`$`, `$.author[0].@id`)
    pub path: String,
    /// Human-readable description
    pub message: String,
    /// `@id` of the instance or `_type` of the schema, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Schema version the check ran against, if relevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Finding {
    /// Create a finding; severity follows from the code
    pub fn new<P, M>(code: FindingCode, path: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            code,
            severity: code.severity(),
            path: path.into(),
            message: message.into(),
            document: None,
            version: None,
        }
    }

    /// Attach the document identity
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Attach the schema version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Whether this finding fails the run
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at '{}': {}", self.severity, self.code, self.path, self.message)?;
        if let Some(document) = &self.document {
            write!(f, " (document: {}", document)?;
            if let Some(version) = &self.version {
                write!(f, ", version: {}", version)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Ordered collection of findings for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub findings: Vec<Finding>,
}

impl Findings {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding
    pub fn add(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Append all findings of another collection
    pub fn extend(&mut self, other: impl IntoIterator<Item = Finding>) {
        self.findings.extend(other);
    }

    /// Whether any error-severity finding is present
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    /// Number of error-severity findings
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }

    /// Findings carrying a given code
    pub fn with_code(&self, code: FindingCode) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.code == code).collect()
    }

    /// Whether any finding carries a given code
    pub fn contains(&self, code: FindingCode) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    /// Check if there are no findings at all
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Total number of findings
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Iterate over findings
    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }
}

impl IntoIterator for Findings {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

impl From<Vec<Finding>> for Findings {
    fn from(findings: Vec<Finding>) -> Self {
        Self { findings }
    }
}

impl fmt::Display for Findings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )?;
        for (i, finding) in self.findings.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, finding)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_code() {
        let finding = Finding::new(FindingCode::SuspiciousEmptyOptional, "$.description", "empty");
        assert_eq!(finding.severity, Severity::Warning);
        assert!(!finding.is_error());

        let finding = Finding::new(FindingCode::UnknownProperty, "$.nickname", "unknown");
        assert!(finding.is_error());
    }

    #[test]
    fn test_findings_counts() {
        let mut findings = Findings::new();
        assert!(!findings.has_errors());
        findings.add(Finding::new(FindingCode::SuspiciousEmptyOptional, "$.a", "w"));
        assert!(!findings.has_errors());
        findings.add(Finding::new(FindingCode::FileNameMismatch, "$.@id", "e"));
        assert!(findings.has_errors());
        assert_eq!(findings.error_count(), 1);
        assert_eq!(findings.warning_count(), 1);
        assert_eq!(findings.with_code(FindingCode::FileNameMismatch).len(), 1);
    }

    #[test]
    fn test_display_includes_context() {
        let finding = Finding::new(FindingCode::PropertyNotApplicable, "$.title", "not applicable")
            .with_document("https://openminds.om-i.org/instances/licenses/mit")
            .with_version("latest");
        let text = finding.to_string();
        assert!(text.contains("[error] PropertyNotApplicable at '$.title'"));
        assert!(text.contains("version: latest"));
    }
}
