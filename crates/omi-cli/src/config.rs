//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables (`GITHUB_TOKEN`)

use crate::error::{Error, Result};
use omi_schemas::sources::checkout::DEFAULT_CLONE_TIMEOUT;
use omi_schemas::sources::{ManifestUrls, RemoteConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where manifests and module sources are published
    pub sources: SourcesConfig,

    /// Local directories
    pub paths: PathConfig,

    /// HTTP client settings
    pub remote: RemoteSettings,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Remote locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// URL of `versions.json`
    pub versions_url: String,

    /// URL of the vocabulary `types.json`
    pub types_url: String,

    /// URL of the vocabulary `properties.json`
    pub properties_url: String,

    /// Base of the GitHub content API (`.../repos`)
    pub content_api_base: String,

    /// Repository holding the class definitions of every version
    pub central_repository: String,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory for downloaded manifests
    pub work_dir: PathBuf,

    /// Root that relative `_extends` references resolve against
    pub schema_root: PathBuf,

    /// Checkout of the central repository
    pub sources_dir: PathBuf,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Connect timeout in seconds
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds; also bounds `git ls-remote`
    pub request_timeout: u64,

    /// Time allowed for cloning the central repository, in seconds
    pub clone_timeout: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Token for the content API; `GITHUB_TOKEN` is used when unset
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let urls = ManifestUrls::default();
        Self {
            versions_url: urls.versions,
            types_url: urls.types,
            properties_url: urls.properties,
            content_api_base: "https://api.github.com/repos".to_string(),
            central_repository: "https://github.com/openMetadataInitiative/openMINDS.git".to_string(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join("omi-validate"))
            .unwrap_or_else(|| home_dir.join(".cache").join("omi-validate"));

        Self {
            work_dir: cache_dir.join("manifests"),
            schema_root: PathBuf::from("."),
            sources_dir: cache_dir.join("sources"),
        }
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        let defaults = RemoteConfig::default();
        Self {
            connect_timeout: defaults.connect_timeout_secs,
            request_timeout: defaults.request_timeout_secs,
            clone_timeout: DEFAULT_CLONE_TIMEOUT.as_secs(),
            user_agent: defaults.user_agent,
            api_token: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let parsed = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| Error::config(format!("{}: {}", path.display(), reason)))
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".omi-validate.yaml"),
            PathBuf::from(".omi-validate.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("omi-validate");
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.json"));
        }

        paths
    }

    /// Settings for the HTTP client, with the token taken from `GITHUB_TOKEN` when unset
    pub fn remote_config(&self) -> RemoteConfig {
        let api_token = self
            .remote
            .api_token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty());

        RemoteConfig {
            connect_timeout_secs: self.remote.connect_timeout,
            request_timeout_secs: self.remote.request_timeout,
            user_agent: self.remote.user_agent.clone(),
            api_token,
            ..RemoteConfig::default()
        }
    }

    /// URLs of the three manifest documents
    pub fn manifest_urls(&self) -> ManifestUrls {
        ManifestUrls {
            versions: self.sources.versions_url.clone(),
            types: self.sources.types_url.clone(),
            properties: self.sources.properties_url.clone(),
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
