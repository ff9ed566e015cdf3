//! Shared utilities for command handlers

use crate::config::is_yaml;
use crate::error::{Error, Result};
use apiprobe_core::Payload;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load a JSON or YAML document, picked by extension
pub fn load_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read {what}");

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format!("{what} as YAML"),
            reason: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format!("{what} as JSON"),
            reason: e.to_string(),
        })
    }
}

/// Load a document that must be a JSON object
pub fn load_payload(path: &Path) -> Result<Payload> {
    match load_document::<Value>(path, "baseline payload")? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "baseline payload".to_string(),
            reason: format!("top level must be an object, found {}", json_kind(&other)),
        }),
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shorten a rendered value for table cells
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_yaml_and_json() {
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "name: Engineering\nsize: 3").unwrap();
        let payload = load_payload(yaml.path()).unwrap();
        assert_eq!(payload["name"], "Engineering");
        assert_eq!(payload["size"], 3);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"name": "Ops"}}"#).unwrap();
        let payload = load_payload(json.path()).unwrap();
        assert_eq!(payload["name"], "Ops");
    }

    #[test]
    fn test_parse_failure_is_invalid_format() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, "{{not json").unwrap();
        let err = load_document::<Value>(json.path(), "suite").unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("suite as JSON"));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, "[1, 2]").unwrap();
        let err = load_payload(json.path()).unwrap_err();
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_document::<Value>(Path::new("/no/such/suite.yaml"), "suite").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
