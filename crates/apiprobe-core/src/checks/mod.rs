//! Named check sets and the runner that evaluates them
//!
//! Every check in a set is evaluated, even after one fails, and each
//! evaluation produces one [`CheckRecord`]. A predicate that panics counts
//! as a failed check; nothing a predicate does can abort the rest of the set.

mod report;

pub use report::{CheckReporter, CheckStats, RecordCollector, StatsSnapshot};

use crate::http::{RawResponse, RequestSummary};
use crate::predicates;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A boolean assertion over one response
pub type Predicate = Box<dyn Fn(&RawResponse) -> bool + Send + Sync>;

/// Ordered mapping from check name to predicate
#[derive(Default)]
pub struct CheckSet {
    checks: Vec<(String, Predicate)>,
}

impl CheckSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check, builder style
    pub fn check<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RawResponse) -> bool + Send + Sync + 'static,
    {
        self.insert(name, predicate);
        self
    }

    /// Add a check; an existing name keeps its position and gets the new predicate
    pub fn insert<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&RawResponse) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let predicate: Predicate = Box::new(predicate);
        match self.checks.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = predicate,
            None => self.checks.push((name, predicate)),
        }
    }

    /// The conventional "should return NNN" status check
    pub fn status(self, expected: u16) -> Self {
        self.check(format!("should return {expected}"), move |response| {
            predicates::is_status(response, expected)
        })
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|(name, _)| name.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.checks.iter().map(|(name, predicate)| (name.as_str(), predicate))
    }
}

impl fmt::Debug for CheckSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Labels attached to every record of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckContext {
    pub feature: String,
    pub case: String,
    pub tags: HashMap<String, String>,
    /// Attach request and response summaries to records
    pub verbose: bool,
}

impl CheckContext {
    pub fn new(feature: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            case: case.into(),
            ..Self::default()
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// The outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRecord {
    pub feature: String,
    pub case: String,
    pub check: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

/// Aggregate outcome of a check set plus the response it ran against
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertResult {
    pub is_success: bool,
    pub response: RawResponse,
    pub failed_checks: Vec<String>,
}

impl AssertResult {
    pub fn failed_count(&self) -> usize {
        self.failed_checks.len()
    }
}

/// Evaluates check sets and fans records out to reporters
#[derive(Clone, Default)]
pub struct CheckRunner {
    reporters: Vec<Arc<dyn CheckReporter>>,
}

impl CheckRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn CheckReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Evaluate every check in `checks` against `response`
    pub fn run(
        &self,
        context: &CheckContext,
        request: Option<&RequestSummary>,
        response: RawResponse,
        checks: &CheckSet,
    ) -> AssertResult {
        let response_view = context
            .verbose
            .then(|| serde_json::to_value(&response).unwrap_or(Value::Null));

        let mut failed_checks = Vec::new();
        for (name, predicate) in checks.iter() {
            let passed = evaluate(name, predicate, &response);
            if !passed {
                failed_checks.push(name.to_string());
            }

            let record = CheckRecord {
                feature: context.feature.clone(),
                case: context.case.clone(),
                check: name.to_string(),
                passed,
                tags: context.tags.clone(),
                request: request.filter(|_| context.verbose).cloned(),
                response: response_view.clone(),
            };
            emit(&record);
            for reporter in &self.reporters {
                reporter.record(&record);
            }
        }

        let result = AssertResult {
            is_success: failed_checks.is_empty(),
            response,
            failed_checks,
        };
        for reporter in &self.reporters {
            reporter.finished(context, &result);
        }
        result
    }
}

impl fmt::Debug for CheckRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRunner")
            .field("reporters", &self.reporters.len())
            .finish()
    }
}

/// Evaluate a check set with no labels and no reporters
pub fn run_checks(response: RawResponse, checks: &CheckSet) -> AssertResult {
    CheckRunner::new().run(&CheckContext::default(), None, response, checks)
}

fn evaluate(name: &str, predicate: &Predicate, response: &RawResponse) -> bool {
    match catch_unwind(AssertUnwindSafe(|| predicate(response))) {
        Ok(passed) => passed,
        Err(_) => {
            tracing::warn!(check = name, "check panicked, counted as failed");
            false
        }
    }
}

fn emit(record: &CheckRecord) {
    let request = record
        .request
        .as_ref()
        .and_then(|request| serde_json::to_string(request).ok());
    let response = record.response.as_ref().map(Value::to_string);

    if record.passed {
        tracing::info!(
            target: "apiprobe::check",
            feature = %record.feature,
            case = %record.case,
            check = %record.check,
            passed = true,
            tags = ?record.tags,
            request = request.as_deref(),
            response = response.as_deref(),
            "check passed"
        );
    } else {
        tracing::warn!(
            target: "apiprobe::check",
            feature = %record.feature,
            case = %record.case,
            check = %record.check,
            passed = false,
            tags = ?record.tags,
            request = request.as_deref(),
            response = response.as_deref(),
            "check failed"
        );
    }
}
