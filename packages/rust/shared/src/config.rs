//! Search configuration for docsearch.
//!
//! Options live in `docsearch.toml` at the site root. Remote-service
//! credentials are never stored there; the CLI reads them from the
//! environment and passes them in as [`CloudCredentials`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocSearchError, Result};
use crate::types::{AnalyticsConfig, VersionName};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docsearch.toml";

/// Remote service used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://cloud.oramasearch.com";

/// Environment variable holding the private API key.
pub const PRIVATE_API_KEY_ENV: &str = "ORAMA_CLOUD_PRIVATE_API_KEY";

// ---------------------------------------------------------------------------
// Config structs (matching docsearch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level search config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote index settings.
    #[serde(default)]
    pub cloud: CloudConfig,

    /// Analytics settings forwarded to the widget in development builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsConfig>,
}

/// `[cloud]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Remote index for the `current` version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,

    /// Remote index per version name.
    #[serde(default)]
    pub versions: BTreeMap<String, String>,

    /// Push a snapshot and deploy it, rather than only fetching query credentials.
    #[serde(default)]
    pub deploy: bool,
}

impl CloudConfig {
    /// Whether remote mode is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.index_id.as_deref().is_some_and(|id| !id.is_empty()) || !self.versions.is_empty()
    }

    /// Whether a full snapshot + deploy was requested.
    pub fn should_deploy(&self) -> bool {
        self.is_enabled() && self.deploy
    }

    /// Resolve the remote index for a version, if one is configured.
    pub fn index_id_for(&self, version: &VersionName) -> Option<&str> {
        let id = if version.is_current() {
            self.index_id
                .as_deref()
                .or_else(|| self.versions.get(VersionName::CURRENT).map(String::as_str))
        } else {
            self.versions.get(version.as_str()).map(String::as_str)
        };
        id.filter(|id| !id.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Credentials (runtime, from environment via the CLI)
// ---------------------------------------------------------------------------

/// Remote-service settings supplied explicitly to the publish step.
#[derive(Clone)]
pub struct CloudCredentials {
    /// Base URL of the remote search service.
    pub base_url: String,
    /// Global index id. Accepted for compatibility; publishing uses per-version ids.
    pub index_id: Option<String>,
    /// Private API key used for access checks, snapshots and deploys.
    pub private_api_key: Option<String>,
}

impl CloudCredentials {
    pub fn new(base_url: Option<String>, private_api_key: Option<String>) -> Self {
        Self {
            base_url: base_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            index_id: None,
            private_api_key,
        }
    }

    /// Return the private key, or a config error if it is missing or empty.
    pub fn require_private_key(&self) -> Result<&str> {
        match self.private_api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(DocSearchError::config(format!(
                "{PRIVATE_API_KEY_ENV} env variable is required"
            ))),
        }
    }
}

impl Default for CloudCredentials {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl std::fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("base_url", &self.base_url)
            .field("index_id", &self.index_id)
            .field(
                "private_api_key",
                &self.private_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file inside a site directory.
pub fn config_file_path(site_dir: &Path) -> PathBuf {
    site_dir.join(CONFIG_FILE_NAME)
}

/// Load the site's config. Returns defaults (local mode) if the file does not exist.
pub fn load_config(site_dir: &Path) -> Result<AppConfig> {
    let path = config_file_path(site_dir);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocSearchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocSearchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into the site directory.
/// Returns the path to the created file.
pub fn init_config(site_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(site_dir).map_err(|e| DocSearchError::io(site_dir, e))?;

    let path = config_file_path(site_dir);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocSearchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocSearchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
