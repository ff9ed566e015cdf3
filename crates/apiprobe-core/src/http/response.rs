//! Raw HTTP response as seen by checks
//!
//! The body is decoded once at construction; a body that is not JSON simply
//! has no JSON view. A transport failure is still a response, with no status.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A response (or the absence of one) handed to predicates
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    /// HTTP status, `None` when the request never produced a response
    pub status: Option<u16>,
    /// Response headers with lower-cased names
    pub headers: HashMap<String, String>,
    /// Body text, lossily decoded
    pub body: String,
    /// Wall time spent waiting for the response
    pub duration_ms: u64,
    /// Transport error message when `status` is `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    json: Option<Value>,
}

impl RawResponse {
    /// Build a response from its wire parts
    pub fn new(
        status: u16,
        headers: HashMap<String, String>,
        body: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        let body = body.into();
        let json = serde_json::from_str(&body).ok();
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status: Some(status),
            headers,
            body,
            duration_ms,
            error: None,
            json,
        }
    }

    /// Build a JSON response without going through the wire format
    pub fn from_json(status: u16, value: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status: Some(status),
            headers,
            body: value.to_string(),
            duration_ms: 0,
            error: None,
            json: Some(value),
        }
    }

    /// A request that failed before any status was received
    pub fn transport_failure(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            status: None,
            headers: HashMap::new(),
            body: String::new(),
            duration_ms,
            error: Some(message.into()),
            json: None,
        }
    }

    /// Decoded JSON body, if the body was JSON
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status.is_none()
    }

    /// Deserialize the JSON body into a typed value
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.json
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_is_decoded_once() {
        let response = RawResponse::new(200, HashMap::new(), r#"{"uri":"http://x/y.jpg"}"#, 12);
        assert_eq!(response.json(), Some(&json!({"uri": "http://x/y.jpg"})));
        assert_eq!(response.status, Some(200));
    }

    #[test]
    fn test_non_json_body_has_no_json_view() {
        let response = RawResponse::new(502, HashMap::new(), "<html>Bad Gateway</html>", 3);
        assert!(response.json().is_none());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = RawResponse::new(200, headers, "{}", 0);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let response = RawResponse::transport_failure("connection reset", 5);
        assert!(response.is_transport_failure());
        assert_eq!(response.error.as_deref(), Some("connection reset"));
        assert!(response.json().is_none());
    }
}
