//! One request, one check set, one result
//!
//! Each `test_*_assert` call issues exactly one HTTP request through the
//! transport, hands the response to the [`CheckRunner`] and returns its
//! [`AssertResult`]. There is no retry: a timeout or a 5xx shows up as
//! failing checks, not as an error.

use super::request::{append_query, join_url, Method, MultipartForm, RequestBody, RequestOption, RequestSpec};
use super::transport::HttpTransport;
use crate::checks::{AssertResult, CheckContext, CheckRunner, CheckSet};
use crate::config::RunConfig;
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Labels, headers, options and tags for one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    pub feature: String,
    pub case: String,
    pub headers: Vec<(String, String)>,
    pub options: Vec<RequestOption>,
    pub tags: HashMap<String, String>,
}

impl TestCase {
    pub fn new(feature: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            case: case.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    pub fn option(mut self, option: RequestOption) -> Self {
        if !self.options.contains(&option) {
            self.options.push(option);
        }
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    fn has_option(&self, option: RequestOption) -> bool {
        self.options.contains(&option)
    }
}

/// Issues requests and evaluates their checks
#[derive(Debug)]
pub struct Orchestrator<T: HttpTransport> {
    transport: T,
    config: RunConfig,
    runner: CheckRunner,
}

impl<T: HttpTransport> Orchestrator<T> {
    pub fn new(transport: T, config: RunConfig) -> Self {
        Self {
            transport,
            config,
            runner: CheckRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: CheckRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// GET with a flat JSON object encoded as query parameters
    pub async fn test_get_assert(
        &self,
        case: &TestCase,
        url: &str,
        params: Option<&Value>,
        checks: &CheckSet,
    ) -> Result<AssertResult> {
        let mut target = join_url(&self.config.base_url, url)?;
        if let Some(params) = params {
            append_query(&mut target, params)?;
        }
        self.assert_request(case, Method::Get, target, RequestBody::Empty, checks)
            .await
    }

    /// POST a JSON body
    pub async fn test_post_json_assert(
        &self,
        case: &TestCase,
        url: &str,
        payload: &Value,
        checks: &CheckSet,
    ) -> Result<AssertResult> {
        let target = join_url(&self.config.base_url, url)?;
        self.assert_request(case, Method::Post, target, RequestBody::Json(payload.clone()), checks)
            .await
    }

    /// PATCH a JSON body
    pub async fn test_patch_json_assert(
        &self,
        case: &TestCase,
        url: &str,
        payload: &Value,
        checks: &CheckSet,
    ) -> Result<AssertResult> {
        let target = join_url(&self.config.base_url, url)?;
        self.assert_request(case, Method::Patch, target, RequestBody::Json(payload.clone()), checks)
            .await
    }

    /// DELETE with no body
    pub async fn test_delete_assert(
        &self,
        case: &TestCase,
        url: &str,
        checks: &CheckSet,
    ) -> Result<AssertResult> {
        let target = join_url(&self.config.base_url, url)?;
        self.assert_request(case, Method::Delete, target, RequestBody::Empty, checks)
            .await
    }

    /// POST a multipart form, typically a file upload
    pub async fn test_post_multipart_assert(
        &self,
        case: &TestCase,
        url: &str,
        form: MultipartForm,
        checks: &CheckSet,
    ) -> Result<AssertResult> {
        let target = join_url(&self.config.base_url, url)?;
        self.assert_request(case, Method::Post, target, RequestBody::Multipart(form), checks)
            .await
    }

    async fn assert_request(
        &self,
        case: &TestCase,
        method: Method,
        url: url::Url,
        body: RequestBody,
        checks: &CheckSet,
    ) -> Result<AssertResult> {
        let spec = RequestSpec {
            method,
            url,
            headers: case.headers.clone(),
            body,
            omit_content_type: case.has_option(RequestOption::NoContentType),
        };

        tracing::debug!(
            feature = %case.feature,
            case = %case.case,
            method = %spec.method,
            url = %spec.url,
            omit_content_type = spec.omit_content_type,
            "sending request"
        );

        let response = self.transport.send(&spec).await?;

        let context = CheckContext {
            feature: case.feature.clone(),
            case: case.case.clone(),
            tags: case.tags.clone(),
            verbose: self.config.debug,
        };
        let summary = spec.summary();
        Ok(self.runner.run(&context, Some(&summary), response, checks))
    }
}
