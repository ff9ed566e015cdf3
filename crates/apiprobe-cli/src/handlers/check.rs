//! Check command handler

use super::utils::load_document;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::suite::{build_checks, CheckSpec};
use apiprobe_core::checks::{CheckContext, CheckRunner};
use apiprobe_core::RawResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use tracing::instrument;

/// A bare list of checks, or an object carrying one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckDocument {
    List(Vec<CheckSpec>),
    Wrapped { checks: Vec<CheckSpec> },
}

impl CheckDocument {
    fn into_specs(self) -> Vec<CheckSpec> {
        match self {
            CheckDocument::List(specs) | CheckDocument::Wrapped { checks: specs } => specs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutcome {
    pub check: String,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub response: String,
    pub status: u16,
    pub passed: bool,
    pub results: Vec<CheckOutcome>,
}

/// Handle the check command
#[instrument(skip(_config, output), fields(checks = %args.checks.display()))]
pub fn handle_check(args: CheckArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let specs = load_document::<CheckDocument>(&args.checks, "check list")?.into_specs();
    if specs.is_empty() {
        return Err(Error::InvalidSuite(format!(
            "{} declares no checks",
            args.checks.display()
        )));
    }

    if !args.response.exists() {
        return Err(Error::FileNotFound {
            path: args.response.clone(),
        });
    }
    let body = fs::read_to_string(&args.response)?;
    let response = RawResponse::new(args.status, HashMap::new(), body, 0);
    if response.json().is_none() {
        tracing::warn!(path = %args.response.display(), "response body is not JSON, path checks will fail");
    }

    let checks = build_checks(&specs);
    let context = CheckContext::new("check", args.response.display().to_string());
    let result = CheckRunner::new().run(&context, None, response, &checks);

    let results: Vec<CheckOutcome> = checks
        .names()
        .map(|name| CheckOutcome {
            check: name.to_string(),
            passed: !result.failed_checks.iter().any(|failed| failed == name),
        })
        .collect();
    let report = CheckReport {
        response: args.response.display().to_string(),
        status: args.status,
        passed: result.is_success,
        results,
    };

    if output.is_human() {
        let rows = report
            .results
            .iter()
            .map(|outcome| vec![outcome.check.clone(), output.verdict(outcome.passed)])
            .collect();
        output.table(&["Check", "Result"], rows)?;
    } else {
        output.data(&report)?;
    }

    let total = report.results.len();
    if result.is_success {
        output.success(&format!("✓ all {total} checks passed"))?;
        Ok(())
    } else {
        Err(Error::ChecksFailed {
            failed: result.failed_count(),
            total,
            unit: "checks",
        })
    }
}
