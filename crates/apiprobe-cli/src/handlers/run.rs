//! Run command handler
//!
//! Cases run one at a time in suite order. A case with a schema is
//! followed by its negative cases, one per generated fixture, each
//! expecting the case's `negative_status`.

use super::utils::{load_document, truncate};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use crate::suite::{build_checks, CaseSpec, Suite, UploadSpec};
use anyhow::Context;
use apiprobe_core::checks::{CheckRunner, CheckSet, CheckStats, RecordCollector, StatsSnapshot};
use apiprobe_core::http::{FilePart, HttpTransport, Method, MultipartForm, Orchestrator, TestCase};
use apiprobe_core::{generate, AssertResult, ReqwestTransport, RunConfig, TransportConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A case ready to send
#[derive(Debug)]
pub struct PlannedCase {
    pub test_case: TestCase,
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
    pub upload: Option<UploadSpec>,
    pub checks: CheckSet,
    pub negative: bool,
}

/// The outcome of one sent case
#[derive(Debug, Serialize)]
pub struct CaseOutcome {
    pub feature: String,
    pub case: String,
    pub method: Method,
    pub path: String,
    pub negative: bool,
    pub passed: bool,
    pub status: Option<u16>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_checks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub suite: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passed: bool,
    pub stats: StatsSnapshot,
    pub cases: Vec<CaseOutcome>,
}

/// Handle the run command
#[instrument(skip(config, output), fields(suite = %args.suite.display()))]
pub async fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("run_command", &format!("suite: {}", args.suite.display()));

    let suite: Suite = load_document(&args.suite, "suite")?;
    suite.validate()?;

    let run_config = merged_run_config(&config.run, &args);
    run_config.validate()?;
    let transport_config = merged_transport_config(&config.transport, &args);

    let suite_name = suite.name.clone().unwrap_or_else(|| {
        args.suite
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "suite".to_string())
    });
    let base_dir = args
        .suite
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let planned = plan_cases(
        &suite,
        &suite_name,
        &config.headers,
        run_config.run_negative_case,
        args.feature.as_deref(),
    )?;
    if planned.is_empty() {
        return Err(Error::InvalidSuite(match &args.feature {
            Some(feature) => format!("no case matches feature '{feature}'"),
            None => "nothing to run".to_string(),
        }));
    }
    info!(cases = planned.len(), base_url = %run_config.base_url, "running suite");

    let stats = Arc::new(CheckStats::new());
    let collector = Arc::new(RecordCollector::default());
    let runner = CheckRunner::new()
        .with_reporter(stats.clone())
        .with_reporter(collector.clone());
    let transport = ReqwestTransport::new(&transport_config)?;
    let orchestrator = Orchestrator::new(transport, run_config.clone()).with_runner(runner);

    output.info(&format!(
        "Running {} cases from '{}' against {}",
        planned.len(),
        suite_name,
        run_config.base_url
    ))?;

    let started_at = Utc::now();
    let progress = output.progress_bar(planned.len() as u64, &suite_name);
    let mut outcomes = Vec::with_capacity(planned.len());
    for case in &planned {
        if let Some(pb) = &progress {
            pb.set_message(case.test_case.case.clone());
        }
        let result = execute(&orchestrator, case, &base_dir).await?;
        outcomes.push(outcome(case, &result));
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = RunReport {
        suite: suite_name,
        base_url: run_config.base_url.clone(),
        started_at,
        finished_at: Utc::now(),
        passed: outcomes.iter().all(|o| o.passed),
        stats: stats.snapshot(),
        cases: outcomes,
    };

    if output.is_human() {
        print_human(output, &report)?;
        if output.is_verbose() {
            for record in collector.failures() {
                output.redacted("failed check:", &serde_json::to_value(&record)?)?;
            }
        }
    } else {
        output.data(&report)?;
    }

    let failed = report.cases.iter().filter(|o| !o.passed).count();
    if failed == 0 {
        output.success(&format!("✓ all {} cases passed", report.cases.len()))?;
        Ok(())
    } else {
        Err(Error::ChecksFailed {
            failed,
            total: report.cases.len(),
            unit: "cases",
        })
    }
}

fn merged_run_config(base: &RunConfig, args: &RunArgs) -> RunConfig {
    let mut run = base.clone();
    if let Some(base_url) = &args.base_url {
        run.base_url = base_url.clone();
    }
    if args.debug {
        run.debug = true;
    }
    if args.skip_negative {
        run.run_negative_case = false;
    }
    run
}

fn merged_transport_config(base: &TransportConfig, args: &RunArgs) -> TransportConfig {
    let mut transport = base.clone();
    if let Some(timeout) = args.timeout {
        transport.timeout_secs = timeout;
    }
    if args.insecure {
        transport.validate_tls = false;
    }
    transport
}

/// Expand a suite into the cases to send, negative cases included
pub fn plan_cases(
    suite: &Suite,
    suite_name: &str,
    default_headers: &BTreeMap<String, String>,
    run_negative: bool,
    feature: Option<&str>,
) -> Result<Vec<PlannedCase>> {
    let mut planned = Vec::new();
    for case in &suite.cases {
        let case_feature = case.feature_or(suite_name);
        if feature.is_some_and(|wanted| wanted != case_feature) {
            debug!(case = %case.name, feature = case_feature, "skipping case outside feature filter");
            continue;
        }

        let base = base_test_case(case, case_feature, default_headers, &suite.headers);
        planned.push(PlannedCase {
            test_case: base.clone(),
            method: case.method,
            path: case.path.clone(),
            payload: case.payload.clone(),
            upload: case.upload.clone(),
            checks: build_checks(&case.checks),
            negative: false,
        });

        if !run_negative {
            continue;
        }
        let (Some(schema), Some(Value::Object(baseline))) = (&case.schema, &case.payload) else {
            continue;
        };
        for fixture in generate(schema, baseline)? {
            let mut test_case = base.clone();
            test_case.case = format!("{} [{} {}]", case.name, fixture.field, fixture.violation);
            let test_case = test_case
                .tag("negative", "true")
                .tag("field", fixture.field.clone())
                .tag("violation", fixture.violation.to_string());
            planned.push(PlannedCase {
                test_case,
                method: case.method,
                path: case.path.clone(),
                payload: Some(Value::Object(fixture.payload)),
                upload: case.upload.clone(),
                checks: CheckSet::new().status(case.negative_status),
                negative: true,
            });
        }
    }
    Ok(planned)
}

fn base_test_case(
    case: &CaseSpec,
    feature: &str,
    default_headers: &BTreeMap<String, String>,
    suite_headers: &BTreeMap<String, String>,
) -> TestCase {
    let mut headers = default_headers.clone();
    headers.extend(suite_headers.clone());
    headers.extend(case.headers.clone());

    let mut test_case = TestCase::new(feature, case.name.clone());
    for (name, value) in headers {
        test_case = test_case.header(name, value);
    }
    for option in &case.options {
        test_case = test_case.option(*option);
    }
    for (key, value) in &case.tags {
        test_case = test_case.tag(key.clone(), value.clone());
    }
    test_case
}

async fn execute<T: HttpTransport>(
    orchestrator: &Orchestrator<T>,
    case: &PlannedCase,
    base_dir: &Path,
) -> Result<AssertResult> {
    let test_case = &case.test_case;
    let result = if let Some(upload) = &case.upload {
        let form = multipart_form(upload, case.payload.as_ref(), base_dir)?;
        orchestrator
            .test_post_multipart_assert(test_case, &case.path, form, &case.checks)
            .await?
    } else {
        match case.method {
            Method::Get => {
                orchestrator
                    .test_get_assert(test_case, &case.path, case.payload.as_ref(), &case.checks)
                    .await?
            }
            Method::Post => {
                let body = json_body(case.payload.as_ref());
                orchestrator
                    .test_post_json_assert(test_case, &case.path, &body, &case.checks)
                    .await?
            }
            Method::Patch => {
                let body = json_body(case.payload.as_ref());
                orchestrator
                    .test_patch_json_assert(test_case, &case.path, &body, &case.checks)
                    .await?
            }
            Method::Delete => {
                orchestrator
                    .test_delete_assert(test_case, &case.path, &case.checks)
                    .await?
            }
        }
    };
    Ok(result)
}

fn json_body(payload: Option<&Value>) -> Value {
    payload
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// The upload file plus the payload's fields as text parts
pub fn multipart_form(upload: &UploadSpec, payload: Option<&Value>, base_dir: &Path) -> Result<MultipartForm> {
    let path: PathBuf = if upload.file.is_absolute() {
        upload.file.clone()
    } else {
        base_dir.join(&upload.file)
    };
    let bytes = std::fs::read(&path).with_context(|| format!("reading upload file {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| upload.field.clone());

    let mut part = FilePart::new(upload.field.clone(), file_name, bytes);
    if let Some(content_type) = &upload.content_type {
        part = part.content_type(content_type.clone());
    }

    let mut form = MultipartForm::new().file(part);
    if let Some(Value::Object(fields)) = payload {
        for (name, value) in fields {
            form = form.text(name.clone(), form_text(value));
        }
    }
    Ok(form)
}

fn form_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn outcome(case: &PlannedCase, result: &AssertResult) -> CaseOutcome {
    CaseOutcome {
        feature: case.test_case.feature.clone(),
        case: case.test_case.case.clone(),
        method: case.method,
        path: case.path.clone(),
        negative: case.negative,
        passed: result.is_success,
        status: result.response.status,
        duration_ms: result.response.duration_ms,
        failed_checks: result.failed_checks.clone(),
        error: result.response.error.clone(),
    }
}

fn print_human(output: &mut OutputWriter, report: &RunReport) -> Result<()> {
    output.section(&format!("Suite: {}", report.suite))?;
    let rows = report
        .cases
        .iter()
        .map(|o| {
            vec![
                truncate(&o.case, 56),
                o.method.to_string(),
                truncate(&o.path, 40),
                o.status.map_or_else(|| "-".to_string(), |s| s.to_string()),
                format!("{}ms", o.duration_ms),
                output.verdict(o.passed),
            ]
        })
        .collect();
    output.table(&["Case", "Method", "Path", "Status", "Time", "Result"], rows)?;

    for failed in report.cases.iter().filter(|o| !o.passed) {
        output.error(&format!("✗ {}", failed.case))?;
        if let Some(error) = &failed.error {
            output.error(&format!("    transport: {error}"))?;
        }
        for check in &failed.failed_checks {
            output.error(&format!("    {check}"))?;
        }
    }

    let stats = &report.stats;
    output.info(&format!(
        "{} requests, {} of {} checks passed ({:.1}%)",
        stats.requests,
        stats.checks_passed,
        stats.checks_total(),
        stats.pass_rate() * 100.0
    ))
}
