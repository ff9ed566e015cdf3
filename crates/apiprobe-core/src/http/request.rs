//! Request description handed to a transport

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use url::Url;

/// Verbs the orchestrator issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::http_request(format!("Unsupported HTTP method: {s}"))),
        }
    }
}

/// Per-request switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOption {
    /// Send the body without a content-type header
    NoContentType,
}

/// One file part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(field_name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type: "application/octet-stream".to_string(),
            bytes,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// A multipart form: text fields and file parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }
}

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// A fully resolved request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub omit_content_type: bool,
}

impl RequestSpec {
    /// A serialisable view for diagnostic records; file bytes are elided
    pub fn summary(&self) -> RequestSummary {
        let body = match &self.body {
            RequestBody::Empty => None,
            RequestBody::Json(value) => Some(value.clone()),
            RequestBody::Multipart(form) => Some(serde_json::json!({
                "fields": form
                    .fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                    .collect::<serde_json::Map<String, Value>>(),
                "files": form.files.iter().map(|file| serde_json::json!({
                    "field": file.field_name,
                    "fileName": file.file_name,
                    "contentType": file.content_type,
                    "size": file.bytes.len(),
                })).collect::<Vec<_>>(),
            })),
        };
        RequestSummary {
            method: self.method,
            url: self.url.to_string(),
            headers: self.headers.clone(),
            body,
            omit_content_type: self.omit_content_type,
        }
    }
}

/// What a check record shows of the request that produced a response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub omit_content_type: bool,
}

/// Join a request target onto a base URL
///
/// Absolute http(s) targets are used as-is; anything else is appended to
/// `base` with exactly one `/` between them.
pub fn join_url(base: &str, target: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(target) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(url);
        }
    }
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        target.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| Error::HttpRequest {
        message: format!("Invalid request URL: {joined}"),
        source: Some(Box::new(e)),
    })
}

/// Append a flat JSON object to `url` as query parameters
///
/// Strings go in verbatim, other scalars as their JSON text, nulls are
/// skipped. Nested values are sent as JSON text.
pub fn append_query(url: &mut Url, params: &Value) -> Result<()> {
    let Some(map) = params.as_object() else {
        if params.is_null() {
            return Ok(());
        }
        return Err(Error::http_request(format!(
            "query parameters must be a JSON object, found {params}"
        )));
    };
    let params: Vec<(&String, String)> = map
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text.clone())),
            other => Some((key, other.to_string())),
        })
        .collect();
    if params.is_empty() {
        return Ok(());
    }
    url.query_pairs_mut()
        .extend_pairs(params.iter().map(|(key, value)| (key.as_str(), value.as_str())));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_url() {
        let url = join_url("http://localhost:8080/", "/v1/department").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/department");
        let url = join_url("http://localhost:8080", "v1/employee").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/employee");
        let url = join_url("http://localhost:8080", "https://cdn.example.com/x").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/x");
    }

    #[test]
    fn test_join_url_rejects_garbage_base() {
        assert!(join_url("not a base", "/v1").is_err());
    }

    #[test]
    fn test_append_query_encodes_scalars() {
        let mut url = Url::parse("http://localhost/v1/department").unwrap();
        append_query(
            &mut url,
            &json!({"limit": 5, "offset": 0, "name": "r&d", "active": true, "skip": null}),
        )
        .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("limit".to_string(), "5".to_string())));
        assert!(pairs.contains(&("name".to_string(), "r&d".to_string())));
        assert!(pairs.contains(&("active".to_string(), "true".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "skip"));
    }

    #[test]
    fn test_append_query_rejects_arrays() {
        let mut url = Url::parse("http://localhost/").unwrap();
        assert!(append_query(&mut url, &json!([1, 2])).is_err());
        assert!(append_query(&mut url, &Value::Null).is_ok());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_summary_elides_file_bytes() {
        let spec = RequestSpec {
            method: Method::Post,
            url: Url::parse("http://localhost/v1/file").unwrap(),
            headers: vec![],
            body: RequestBody::Multipart(
                MultipartForm::new().file(FilePart::new("file", "a.jpg", vec![0; 64]).content_type("image/jpeg")),
            ),
            omit_content_type: false,
        };
        let summary = spec.summary();
        assert_eq!(summary.body.unwrap()["files"][0]["size"], json!(64));
    }
}
