//! Blocking HTTP and git transport for remote schema lookups
//!
//! Copyright (c) 2025 openMINDS Validation Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::sources::process::output_with_deadline;
use crate::sources::RemoteSource;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Settings for the HTTP transport
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Token for the content API, sent only to `api_host`
    pub api_token: Option<String>,
    /// Host receiving the token
    pub api_host: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("omi-validate/{}", env!("CARGO_PKG_VERSION")),
            api_token: None,
            api_host: "api.github.com".to_string(),
        }
    }
}

/// [`RemoteSource`] backed by `reqwest::blocking` and `git ls-remote`
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    config: RemoteConfig,
}

impl HttpRemote {
    /// Create a transport with bounded timeouts
    pub fn new(config: RemoteConfig) -> LoaderResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LoaderError::remote("<client>", format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Transport settings
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn wants_token(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h == self.config.api_host))
            .unwrap_or(false)
    }
}

impl RemoteSource for HttpRemote {
    fn fetch(&self, url: &str) -> LoaderResult<Option<Vec<u8>>> {
        let mut request = self.client.get(url);
        if let Some(token) = self.config.api_token.as_deref().filter(|_| self.wants_token(url)) {
            request = request.bearer_auth(token);
        }

        let response = match request.send() {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(url = %url, "Remote fetch timed out");
                return Ok(None);
            }
            Err(e) => return Err(LoaderError::remote(url, e)),
        };

        let status = response.status();
        debug!(url = %url, status = %status, "Remote fetch completed");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LoaderError::remote(url, format!("HTTP {}", status)));
        }

        match response.bytes() {
            Ok(body) => Ok(Some(body.to_vec())),
            Err(e) if e.is_timeout() => {
                warn!(url = %url, "Remote body read timed out");
                Ok(None)
            }
            Err(e) => Err(LoaderError::remote(url, e)),
        }
    }

    fn list_branches(&self, repository: &str) -> LoaderResult<Vec<String>> {
        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let mut command = Command::new("git");
        command
            .args(["ls-remote", "--heads", repository])
            .env("GIT_TERMINAL_PROMPT", "0");
        let output = output_with_deadline(&mut command, timeout)
            .map_err(|e| LoaderError::remote(repository, format!("failed to run git: {}", e)))?;

        let Some(output) = output else {
            warn!(repository = %repository, timeout_secs = timeout.as_secs(), "git ls-remote timed out");
            return Ok(Vec::new());
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(repository = %repository, "git ls-remote failed: {}", stderr.trim());
            return Ok(Vec::new());
        }

        let branches = parse_ls_remote(&String::from_utf8_lossy(&output.stdout));
        debug!(repository = %repository, count = branches.len(), "Listed remote branches");
        Ok(branches)
    }
}

/// Branch names from `git ls-remote --heads` output, in listing order
pub fn parse_ls_remote(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/heads/"))
        .map(str::to_string)
        .collect()
}
