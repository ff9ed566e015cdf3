//! Error types for the Apiprobe core library
//!
//! Only caller mistakes that can be detected before a request leaves the
//! process are surfaced as [`Error`]. Path misses, predicate failures,
//! type-guard rejections and transport failures are ordinary `false`
//! results and never reach this type.

use thiserror::Error;

/// Main error type for Apiprobe operations
#[derive(Error, Debug)]
pub enum Error {
    /// A field-constraint schema is internally inconsistent
    #[error("Invalid schema for field '{field}': {message}")]
    InvalidSchema { field: String, message: String },

    /// A path expression could not be parsed
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// HTTP request building errors
    #[error("HTTP request error: {message}")]
    HttpRequest {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a schema error on one field
    pub fn invalid_schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a request building error without an underlying source
    pub fn http_request(message: impl Into<String>) -> Self {
        Error::HttpRequest {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<crate::path::PathError> for Error {
    fn from(err: crate::path::PathError) -> Self {
        Error::InvalidPath {
            path: err.input().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_schema("name", "minLength 5 exceeds maxLength 3");
        assert_eq!(
            err.to_string(),
            "Invalid schema for field 'name': minLength 5 exceeds maxLength 3"
        );
    }

    #[test]
    fn test_json_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_http_request_shorthand() {
        let err = Error::http_request("Invalid URL");
        assert_eq!(err.to_string(), "HTTP request error: Invalid URL");
    }
}
