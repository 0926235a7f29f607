//! Curator configuration
//!
//! Read from an optional YAML file, then overridden from the environment.
//! Every field has a default, so an absent file is not an error.

use crate::curator::SuggestionMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5050";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_URL: &str = "CURATOR_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CURATOR_TIMEOUT_SECS";

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Base URL of the backend, without the `/api` suffix
    pub api_url: String,
    pub timeout_secs: u64,
    pub suggestion_mode: SuggestionMode,
    /// Write the rendered YAML next to the draft after a successful submit
    pub download: bool,
    /// Start a fresh session after a successful submit
    pub reset_after_submit: bool,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            suggestion_mode: SuggestionMode::default(),
            download: false,
            reset_after_submit: false,
        }
    }
}

impl CuratorConfig {
    /// Load from `path` if given, else from the default location if it
    /// exists, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) if path.is_some() || p.exists() => Self::from_file(&p)?,
            _ => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply `CURATOR_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_SECS,
                value,
            })?;
        }
        Ok(())
    }
}

/// `<config dir>/schema-curator/config.yaml`, when the platform has a config
/// directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("schema-curator").join("config.yaml"))
}
