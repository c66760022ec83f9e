//! Suite result -- the ordered record of one suite run.
//!
//! A [`SuiteResult`] is built by the sequencer through a [`SuiteRecorder`]
//! and is immutable once finished. It is the only thing the exit-status
//! layer and the notifier see.

use std::fmt;
use std::fmt::Write as _;
use std::time::Duration;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use volsuite_core::verdict::Verdict;

use crate::scenario::{ScenarioReport, StepRecord};

/// Why a suite stopped before running every scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HaltReason {
    /// A scenario's verdict was FAIL.
    ScenarioFailed { scenario: String },
    /// A test binary could not be started.
    LaunchFailure { scenario: String, error: String },
    /// Cancellation was requested between steps.
    Cancelled,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScenarioFailed { scenario } => write!(f, "scenario '{scenario}' failed"),
            Self::LaunchFailure { scenario, error } => {
                write!(f, "launch failure in scenario '{scenario}': {error}")
            }
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One attempted scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioEntry {
    pub name: String,
    pub verdict: Verdict,
    pub message: String,
    #[serde(rename = "wall_clock_secs", serialize_with = "serialize_secs")]
    pub wall_clock: Duration,
    pub steps: Vec<StepRecord>,
}

impl From<ScenarioReport> for ScenarioEntry {
    fn from(report: ScenarioReport) -> Self {
        Self {
            name: report.name,
            verdict: report.verdict,
            message: report.message,
            wall_clock: report.wall_clock,
            steps: report.steps,
        }
    }
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Finalised result of a suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    run_id: String,
    suite: String,
    planned: usize,
    entries: Vec<ScenarioEntry>,
    success: bool,
    halt: Option<HaltReason>,
}

impl SuiteResult {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Number of scenarios the suite contained.
    pub fn planned(&self) -> usize {
        self.planned
    }

    /// Attempted scenarios, in execution order.
    pub fn entries(&self) -> &[ScenarioEntry] {
        &self.entries
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn halt(&self) -> Option<&HaltReason> {
        self.halt.as_ref()
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|e| e.verdict.is_pass()).count()
    }

    /// Plain-text summary handed to the notifier.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let status = if self.success { "PASSED" } else { "FAILED" };
        let _ = writeln!(
            out,
            "suite '{}' {} ({}/{} scenarios passed) [run {}]",
            self.suite,
            status,
            self.passed(),
            self.planned,
            self.run_id
        );
        for entry in &self.entries {
            let tag = if entry.verdict.is_pass() { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "  [{tag}] {} ({:.0}s): {}",
                entry.name,
                entry.wall_clock.as_secs_f64(),
                entry.message
            );
        }
        if let Some(halt) = &self.halt {
            let skipped = self.planned.saturating_sub(self.entries.len());
            let _ = writeln!(out, "halted: {halt}; {skipped} scenario(s) not run");
        }
        out
    }
}

/// Appends entries during a run and produces the final [`SuiteResult`].
#[derive(Debug)]
pub struct SuiteRecorder {
    run_id: String,
    suite: String,
    planned: usize,
    entries: Vec<ScenarioEntry>,
    halt: Option<HaltReason>,
}

impl SuiteRecorder {
    pub fn new(suite: impl Into<String>, planned: usize) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            suite: suite.into(),
            planned,
            entries: Vec::new(),
            halt: None,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record(&mut self, entry: ScenarioEntry) {
        self.entries.push(entry);
    }

    /// Marks the run halted; the first reason wins.
    pub fn halt(&mut self, reason: HaltReason) {
        if self.halt.is_none() {
            self.halt = Some(reason);
        }
    }

    pub fn finish(self) -> SuiteResult {
        let success = self.halt.is_none()
            && self.entries.len() == self.planned
            && self.entries.iter().all(|e| e.verdict.is_pass());
        SuiteResult {
            run_id: self.run_id,
            suite: self.suite,
            planned: self.planned,
            entries: self.entries,
            success,
            halt: self.halt,
        }
    }
}
