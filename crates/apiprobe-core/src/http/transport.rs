//! The HTTP capability the orchestrator sends requests through

use super::request::{Method, RequestBody, RequestSpec};
use super::response::RawResponse;
use crate::config::TransportConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client as ReqwestClient;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Sends one request and hands back whatever came back
///
/// Implementations never retry. A request that fails on the wire is an
/// `Ok` transport-failure response; `Err` is reserved for requests that
/// could not be built at all.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> Result<RawResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, request: &RequestSpec) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.validate_tls)
            .build()
            .map_err(|e| Error::HttpRequest {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(&TransportConfig::default())
    }

    fn build(&self, spec: &RequestSpec) -> Result<reqwest::Request> {
        let method = match spec.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, spec.url.clone());
        for (name, value) in &spec.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &spec.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form)?),
        };

        let mut request = builder.build().map_err(|e| Error::HttpRequest {
            message: format!("Failed to build request: {}", e),
            source: Some(Box::new(e)),
        })?;

        if spec.omit_content_type {
            request.headers_mut().remove(CONTENT_TYPE);
        }
        Ok(request)
    }
}

fn multipart_form(form: &super::request::MultipartForm) -> Result<Form> {
    let mut multipart = Form::new();
    for (name, value) in &form.fields {
        multipart = multipart.text(name.clone(), value.clone());
    }
    for file in &form.files {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| Error::HttpRequest {
                message: format!("Invalid content type '{}': {}", file.content_type, e),
                source: Some(Box::new(e)),
            })?;
        multipart = multipart.part(file.field_name.clone(), part);
    }
    Ok(multipart)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<RawResponse> {
        let request = self.build(spec)?;
        let started = Instant::now();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = elapsed_ms(started);
                tracing::warn!(method = %spec.method, url = %spec.url, error = %e, "request failed");
                return Ok(RawResponse::transport_failure(e.to_string(), elapsed));
            }
        };

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        match response.bytes().await {
            Ok(bytes) => {
                let elapsed = elapsed_ms(started);
                tracing::debug!(method = %spec.method, url = %spec.url, status, duration_ms = elapsed, "response received");
                Ok(RawResponse::new(
                    status,
                    headers,
                    String::from_utf8_lossy(&bytes),
                    elapsed,
                ))
            }
            Err(e) => {
                let elapsed = elapsed_ms(started);
                tracing::warn!(method = %spec.method, url = %spec.url, status, error = %e, "failed reading response body");
                Ok(RawResponse::transport_failure(e.to_string(), elapsed))
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
