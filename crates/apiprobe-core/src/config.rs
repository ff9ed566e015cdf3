//! Run and transport configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Settings shared by every request of a run
///
/// `run_negative_case` and `verify_changes` are never read by the
/// orchestrator; the caller decides whether to issue those calls at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub base_url: String,
    /// Emit request and response summaries with every check record
    pub debug: bool,
    pub run_negative_case: bool,
    pub verify_changes: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            debug: false,
            run_negative_case: true,
            verify_changes: true,
        }
    }
}

impl RunConfig {
    /// Defaults overridden by `BASE_URL` and `DEBUG`, loading `.env` first
    pub fn from_env() -> Self {
        load_dotenv();
        Self::default().with_env()
    }

    /// Apply `BASE_URL` and `DEBUG` from the process environment
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = env::var("BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url;
            }
        }
        if let Ok(debug) = env::var("DEBUG") {
            self.debug = parse_flag(&debug);
        }
        self
    }

    /// Check the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| Error::Configuration {
            message: format!("invalid base_url '{}': {}", self.base_url, e),
            source: Some(e.into()),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Error::Configuration {
                message: format!("base_url must use http or https, found '{other}'"),
                source: None,
            }),
        }
    }
}

/// Load `.env` from the working directory or its ancestors, if any
pub fn load_dotenv() -> Option<PathBuf> {
    let path = dotenv::dotenv().ok()?;
    tracing::debug!(path = %path.display(), "loaded .env");
    Some(path)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Settings for the reqwest-backed transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub timeout_secs: u64,
    pub validate_tls: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            validate_tls: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(!config.debug);
        assert!(config.run_negative_case);
        assert!(config.verify_changes);
        assert_eq!(TransportConfig::default().timeout_secs, 30);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(config.debug);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.verify_changes);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_validate_base_url() {
        assert!(RunConfig::default().validate().is_ok());
        let config = RunConfig {
            base_url: "ftp://example.com".to_string(),
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
        let config = RunConfig {
            base_url: "not a url".to_string(),
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
