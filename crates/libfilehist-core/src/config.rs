use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HistError;
use crate::types::BackendKind;
use crate::{
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_MAX_BLOB_BYTES, DEFAULT_MAX_PAGE_BYTES, DEFAULT_PAGE_SIZE,
};

/// User-level configuration stored in `$XDG_CONFIG_HOME/filehist/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistConfig {
    /// Commits requested per `loadMore`
    pub page_size: usize,
    /// Ceiling for the summed content size of one page
    pub max_page_bytes: usize,
    /// Ceiling for a single blob read from a backend
    pub max_blob_bytes: usize,
    /// Timeout for one page fetch (0 = no timeout)
    pub fetch_timeout_ms: u64,
    /// History source
    pub backend: BackendConfig,
}

impl Default for HistConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            backend: BackendConfig::default(),
        }
    }
}

/// Backend selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Required for hosted kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted: Option<HostedConfig>,
}

/// Settings for the GitHub and GitLab backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedConfig {
    /// API root, e.g. `https://api.github.com` or `https://gitlab.com/api/v4`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// `owner/name` on GitHub, numeric id or `group/project` on GitLab
    pub repo: String,
    /// Branch or revision to start from (default: the repository's default branch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// Environment variable holding the API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl HostedConfig {
    /// Read the token from the configured environment variable, if any
    pub fn token(&self) -> Option<String> {
        self.token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.is_empty())
    }
}

impl HistConfig {
    /// Validate values that would otherwise fail deep inside a fetch
    pub fn validate(&self) -> Result<(), HistError> {
        if self.page_size == 0 {
            return Err(HistError::InvalidArgs("page_size must be at least 1".to_string()));
        }
        if self.max_page_bytes == 0 || self.max_blob_bytes == 0 {
            return Err(HistError::InvalidArgs(
                "max_page_bytes and max_blob_bytes must be positive".to_string(),
            ));
        }
        if self.backend.kind.is_hosted() && self.backend.hosted.is_none() {
            return Err(HistError::InvalidArgs(format!(
                "backend kind '{}' requires a [backend.hosted] section",
                self.backend.kind
            )));
        }
        Ok(())
    }
}

/// Default config file location
///
/// `$XDG_CONFIG_HOME/filehist/config.toml`, falling back to
/// `$HOME/.config/filehist/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir).join("filehist").join("config.toml"));
        }
    }
    std::env::var("HOME")
        .ok()
        .filter(|h| !h.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("filehist").join("config.toml"))
}

/// Load config from the given path; a missing file yields defaults
pub fn load_config(path: &Path) -> Result<HistConfig, HistError> {
    if !path.exists() {
        return Ok(HistConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: HistConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit path or the default location
pub fn resolve_config(explicit: Option<&Path>) -> Result<HistConfig, HistError> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(HistError::NotFound(format!(
                    "config file {}",
                    path.display()
                )));
            }
            load_config(path)
        }
        None => match default_config_path() {
            Some(path) => load_config(&path),
            None => Ok(HistConfig::default()),
        },
    }
}

/// Save config to the given path
pub fn save_config(path: &Path, config: &HistConfig) -> Result<(), HistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
