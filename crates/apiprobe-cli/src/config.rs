//! Configuration management for the CLI
//!
//! Precedence, lowest first: defaults, configuration file (YAML/JSON),
//! environment variables, command-line flags. Flags are applied by the
//! handlers that own them.

use crate::error::{Error, Result};
use apiprobe_core::{RunConfig, TransportConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run settings shared by every request
    pub run: RunConfig,

    /// HTTP transport settings
    pub transport: TransportConfig,

    /// Default headers sent with every suite request
    pub headers: std::collections::BTreeMap<String, String>,
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

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable configuration");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load from a specific file or the default locations, then apply the environment
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.apply_env();
        Ok(config)
    }

    /// `.env`, then `BASE_URL`, `DEBUG` and `APIPROBE_TIMEOUT`
    pub fn apply_env(&mut self) {
        apiprobe_core::config::load_dotenv();
        self.run = std::mem::take(&mut self.run).with_env();

        if let Ok(timeout) = std::env::var("APIPROBE_TIMEOUT") {
            match timeout.trim().parse() {
                Ok(secs) => self.transport.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %timeout, "ignoring invalid APIPROBE_TIMEOUT"),
            }
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".apiprobe.yaml"),
            PathBuf::from(".apiprobe.json"),
            PathBuf::from("apiprobe.yaml"),
            PathBuf::from("apiprobe.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let apiprobe_dir = config_dir.join("apiprobe");
            paths.push(apiprobe_dir.join("config.yaml"));
            paths.push(apiprobe_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".apiprobe.yaml"));
            paths.push(home_dir.join(".apiprobe.json"));
        }

        paths
    }

    /// Validate the merged configuration
    pub fn validate(&self) -> Result<()> {
        self.run
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;
        if self.transport.timeout_secs == 0 {
            return Err(Error::config("transport.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
