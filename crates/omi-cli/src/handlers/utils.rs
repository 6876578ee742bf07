//! Shared setup for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, RunSummary};
use omi_schemas::sources::{HttpRemote, Manifests};
use omi_schemas::DocumentReport;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the HTTP client from the remote settings
pub fn remote(config: &Config) -> Result<Arc<HttpRemote>> {
    let remote = HttpRemote::new(config.remote_config())?;
    debug!(
        user_agent = %remote.config().user_agent,
        authenticated = remote.config().api_token.is_some(),
        "HTTP client ready"
    );
    Ok(Arc::new(remote))
}

/// Manifests in the work dir, refreshed from the configured URLs unless offline
pub fn manifests(config: &Config, remote: &HttpRemote, offline: bool) -> Result<Manifests> {
    let work_dir = &config.paths.work_dir;
    if offline {
        info!(path = %work_dir.display(), "Using previously downloaded manifests");
        return Ok(Manifests::at(work_dir));
    }

    let _timer = Timer::with_details("manifest_download", &work_dir.display().to_string());
    Ok(Manifests::download(remote, &config.manifest_urls(), work_dir)?)
}

/// Fail early with a CLI error for input files that do not exist
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Print the reports and turn them into the process verdict
pub fn finish(reports: &[DocumentReport], output: &mut OutputWriter) -> Result<()> {
    let summary = RunSummary::new(reports);
    output.section("Results")?;
    output.summary(&summary)?;
    verdict(&summary)?;
    output.success("✓ No errors found")
}

/// Fatal documents win over error findings
pub fn verdict(summary: &RunSummary<'_>) -> Result<()> {
    if summary.fatal > 0 {
        return Err(Error::Fatal {
            failed: summary.fatal,
            total: summary.documents,
        });
    }
    if summary.errors > 0 {
        return Err(Error::ValidationFailed {
            errors: summary.errors,
            documents: summary.failed_documents(),
        });
    }
    Ok(())
}
