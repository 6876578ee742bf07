//! Semantic version parsing for version labels and branch names
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

static BRANCH_PATTERN: OnceLock<Regex> = OnceLock::new();

fn branch_pattern() -> &'static Regex {
    BRANCH_PATTERN.get_or_init(|| {
        Regex::new(r"^v(\d+)(?:\.(\d+))?(?:\.(\d+))?$").expect("branch pattern is a valid regex")
    })
}

/// Version parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
}

/// Semantic version; missing minor/patch components default to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `v<major>[.<minor>[.<patch>]]` (the leading `v` is optional)
    ///
    /// `v3` canonicalises to `3.0.0`, `v2.1` to `2.1.0`.
    pub fn parse(version_str: &str) -> Result<Self, VersionError> {
        let trimmed = version_str.trim();
        let without_prefix = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let parts: Vec<&str> = without_prefix.split('.').collect();
        if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(VersionError::InvalidFormat(format!(
                "Expected format [v]X[.Y[.Z]], got: {}",
                version_str
            )));
        }

        let component = |idx: usize, name: &str| -> Result<u32, VersionError> {
            match parts.get(idx) {
                Some(raw) => raw.parse().map_err(|_| {
                    VersionError::InvalidFormat(format!("Invalid {} version: {}", name, raw))
                }),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: component(0, "major")?,
            minor: component(1, "minor")?,
            patch: component(2, "patch")?,
        })
    }

    /// Parse a branch name, accepting only the strict `v<major>[.<minor>[.<patch>]]` form
    ///
    /// Returns `None` for anything else (`main`, `dev`, `v3-beta`, ...).
    pub fn from_branch_name(branch: &str) -> Option<Self> {
        let captures = branch_pattern().captures(branch)?;
        let part = |idx: usize| -> Option<u32> {
            match captures.get(idx) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(0),
            }
        };
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}
