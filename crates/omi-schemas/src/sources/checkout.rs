//! Shallow checkout of a module or central sources repository
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use std::path::{Path, PathBuf};
use crate::sources::process::output_with_deadline;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Time allowed for a clone unless overridden
pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(300);

/// Materialises a git repository on disk with `git clone --depth 1`
#[derive(Debug, Clone)]
pub struct SourceCheckout {
    repository: String,
    branch: Option<String>,
    timeout: Duration,
}

impl SourceCheckout {
    /// Checkout of the default branch of `repository`
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: None,
            timeout: DEFAULT_CLONE_TIMEOUT,
        }
    }

    /// Check out a specific branch instead of the default one
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Kill the clone if it has not finished after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Repository being checked out
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Clone into `dest` unless it already exists and return the local path
    ///
    /// With `refetch` an existing checkout is removed and cloned again. The
    /// `.git` directory is dropped after cloning; only the files are needed.
    pub fn materialize(&self, dest: &Path, refetch: bool) -> LoaderResult<PathBuf> {
        if refetch && dest.exists() {
            debug!(path = %dest.display(), "Removing existing checkout");
            std::fs::remove_dir_all(dest)
                .map_err(|e| LoaderError::remote(&self.repository, format!("{}: {}", dest.display(), e)))?;
        }

        if dest.exists() {
            debug!(path = %dest.display(), "Reusing existing checkout");
            return Ok(dest.to_path_buf());
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LoaderError::remote(&self.repository, format!("{}: {}", parent.display(), e)))?;
        }

        info!(repository = %self.repository, path = %dest.display(), "Cloning sources");
        let mut command = Command::new("git");
        command.args(["clone", "--depth", "1"]);
        if let Some(branch) = &self.branch {
            command.args(["--branch", branch]);
        }
        command
            .arg(&self.repository)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0");
        let output = output_with_deadline(&mut command, self.timeout)
            .map_err(|e| LoaderError::remote(&self.repository, format!("failed to run git: {}", e)))?;

        let Some(output) = output else {
            if dest.exists() {
                if let Err(e) = std::fs::remove_dir_all(dest) {
                    warn!(path = %dest.display(), "Could not remove partial checkout: {}", e);
                }
            }
            return Err(LoaderError::remote(
                &self.repository,
                format!("git clone timed out after {}s", self.timeout.as_secs()),
            ));
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LoaderError::remote(&self.repository, stderr.trim()));
        }

        let git_dir = dest.join(".git");
        if git_dir.exists() {
            std::fs::remove_dir_all(&git_dir)
                .map_err(|e| LoaderError::remote(&self.repository, format!("{}: {}", git_dir.display(), e)))?;
        }
        Ok(dest.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_existing_checkout_is_reused() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("sources");
        std::fs::create_dir_all(dest.join("schemas")).unwrap();

        let checkout = SourceCheckout::new("https://invalid.example/repo.git");
        let path = checkout.materialize(&dest, false).unwrap();
        assert_eq!(path, dest);
        assert!(dest.join("schemas").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_stalled_clone_is_killed() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("sources");
        std::env::set_var("GIT_SSH_COMMAND", "sleep 30; true");
        let started = std::time::Instant::now();
        let result = SourceCheckout::new("ssh://git@example.invalid/o/r.git")
            .with_timeout(Duration::from_secs(1))
            .materialize(&dest, false);
        std::env::remove_var("GIT_SSH_COMMAND");

        assert!(started.elapsed() < Duration::from_secs(10), "took {:?}", started.elapsed());
        assert!(matches!(result, Err(LoaderError::Remote { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_failed_clone_is_remote_error() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("sources");
        let checkout = SourceCheckout::new(dir.path().join("missing-repo").display().to_string());
        assert!(matches!(
            checkout.materialize(&dest, true),
            Err(LoaderError::Remote { .. })
        ));
    }
}
