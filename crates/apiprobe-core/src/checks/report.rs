//! Sinks for check records

use super::{AssertResult, CheckContext, CheckRecord};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Receives every check record as it is produced
pub trait CheckReporter: Send + Sync {
    fn record(&self, record: &CheckRecord);

    /// Called once per check set, after all records
    fn finished(&self, _context: &CheckContext, _result: &AssertResult) {}
}

/// Lock-free pass/fail counters, shareable across concurrent iterations
#[derive(Debug, Default)]
pub struct CheckStats {
    checks_passed: AtomicU64,
    checks_failed: AtomicU64,
    requests: AtomicU64,
    requests_failed: AtomicU64,
}

/// A point-in-time copy of [`CheckStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub checks_passed: u64,
    pub checks_failed: u64,
    pub requests: u64,
    pub requests_failed: u64,
}

impl StatsSnapshot {
    pub fn checks_total(&self) -> u64 {
        self.checks_passed + self.checks_failed
    }

    /// Share of passed checks, 1.0 when nothing ran
    pub fn pass_rate(&self) -> f64 {
        match self.checks_total() {
            0 => 1.0,
            total => self.checks_passed as f64 / total as f64,
        }
    }
}

impl CheckStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            checks_passed: self.checks_passed.load(Ordering::Relaxed),
            checks_failed: self.checks_failed.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

impl CheckReporter for CheckStats {
    fn record(&self, record: &CheckRecord) {
        let counter = if record.passed {
            &self.checks_passed
        } else {
            &self.checks_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn finished(&self, _context: &CheckContext, result: &AssertResult) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if !result.is_success {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct RecordCollector {
    records: Mutex<Vec<CheckRecord>>,
}

impl RecordCollector {
    pub fn records(&self) -> Vec<CheckRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn failures(&self) -> Vec<CheckRecord> {
        self.records().into_iter().filter(|r| !r.passed).collect()
    }
}

impl CheckReporter for RecordCollector {
    fn record(&self, record: &CheckRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record.clone()),
            Err(poisoned) => poisoned.into_inner().push(record.clone()),
        }
    }
}
