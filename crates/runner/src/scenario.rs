//! Scenario model and single-scenario execution.
//!
//! A [`ScenarioSpec`] is an ordered list of [`ScenarioStep`]s: plain process
//! invocations, or a crash/replay [`RecoveryCycleSpec`] expanded by the
//! recovery loop controller. Steps run strictly in order and the first
//! failing step ends the scenario.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use volsuite_core::error::LaunchError;
use volsuite_core::outcome::Outcome;
use volsuite_core::step::{ExpectedOutcome, Step};
use volsuite_core::verdict::{self, Verdict};

use crate::process::StepExecutor;
use crate::recovery::{RecoveryCycleSpec, RecoveryLoop};

/// One entry of a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioStep {
    /// Single process invocation.
    Run(Step),
    /// Repeated verify/abort cycles followed by a full verification.
    RecoveryLoop(RecoveryCycleSpec),
}

impl ScenarioStep {
    /// Upper bound on process invocations this entry can make.
    pub fn max_invocations(&self) -> usize {
        match self {
            Self::Run(_) => 1,
            Self::RecoveryLoop(cycle) => cycle.max_invocations(),
        }
    }
}

/// A named fault-tolerance scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSpec {
    /// Unique registry key.
    pub name: String,
    /// What the scenario exercises.
    pub description: String,
    /// Ordered, non-empty list of entries.
    pub steps: Vec<ScenarioStep>,
    /// Pause applied after the scenario before the next one starts.
    pub cooldown: Duration,
}

impl ScenarioSpec {
    /// Creates an empty scenario; add entries with [`step`](Self::step) and
    /// [`recovery_loop`](Self::recovery_loop).
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            cooldown: Duration::ZERO,
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(ScenarioStep::Run(step));
        self
    }

    pub fn recovery_loop(mut self, cycle: RecoveryCycleSpec) -> Self {
        self.steps.push(ScenarioStep::RecoveryLoop(cycle));
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn max_invocations(&self) -> usize {
        self.steps.iter().map(ScenarioStep::max_invocations).sum()
    }
}

/// Result of one executed step, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub label: String,
    pub expected: ExpectedOutcome,
    pub outcome: Outcome,
    pub verdict: Verdict,
    /// Human-readable explanation of the verdict.
    pub detail: String,
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    /// `Pass` or `Fail`; step-level `AbortedAsExpected` counts as a pass.
    pub verdict: Verdict,
    pub message: String,
    pub steps: Vec<StepRecord>,
    pub wall_clock: Duration,
    /// Stopped between steps because cancellation was requested.
    pub cancelled: bool,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.verdict, self.name, self.message)
    }
}

/// Runs one step and judges it against `expected`.
///
/// Failures tolerated under `MayFail` are logged here, keeping the
/// interpreter itself pure.
pub(crate) async fn run_step<E: StepExecutor>(
    executor: &E,
    step: &Step,
    expected: ExpectedOutcome,
) -> Result<StepRecord, LaunchError> {
    let outcome = executor.execute(step).await?;
    let verdict = verdict::judge(expected, &outcome);
    let detail = verdict::explain(expected, &outcome, verdict);

    match verdict {
        Verdict::Fail => error!(
            step = %step.label,
            expected = %expected,
            exit_code = outcome.exit_code,
            signaled = outcome.signaled,
            timed_out = outcome.timed_out,
            "step failed: {detail}"
        ),
        Verdict::AbortedAsExpected => info!(step = %step.label, "step aborted as expected"),
        Verdict::Pass if !outcome.is_clean_exit() => warn!(
            step = %step.label,
            exit_code = outcome.exit_code,
            signaled = outcome.signaled,
            "step failure tolerated"
        ),
        Verdict::Pass => info!(step = %step.label, "step passed"),
    }

    Ok(StepRecord {
        label: step.label.clone(),
        expected,
        outcome,
        verdict,
        detail,
    })
}

/// Runs every entry of `spec` in order, stopping at the first failure.
///
/// Cancellation is only observed between steps; a running process is never
/// interrupted.
///
/// # Errors
///
/// Returns the [`LaunchError`] of the first step that could not be started.
pub async fn run_scenario<E: StepExecutor>(
    executor: &E,
    spec: &ScenarioSpec,
    cancel: &CancellationToken,
) -> Result<ScenarioReport, LaunchError> {
    let started = Instant::now();
    let mut records = Vec::new();

    for entry in &spec.steps {
        match entry {
            ScenarioStep::Run(step) => {
                if cancel.is_cancelled() {
                    return Ok(cancelled_report(spec, records, started));
                }
                let record = run_step(executor, step, step.expected).await?;
                let failed = record.verdict == Verdict::Fail;
                let message = format!("step '{}' {}", record.label, record.detail);
                records.push(record);
                if failed {
                    return Ok(ScenarioReport {
                        name: spec.name.clone(),
                        verdict: Verdict::Fail,
                        message,
                        steps: records,
                        wall_clock: started.elapsed(),
                        cancelled: false,
                    });
                }
            }
            ScenarioStep::RecoveryLoop(cycle) => {
                let report = RecoveryLoop::new(executor, cycle).run(cancel).await?;
                let message = report.message.clone();
                let verdict = report.verdict;
                let cancelled = report.cancelled;
                records.extend(report.steps);
                if cancelled {
                    return Ok(cancelled_report(spec, records, started));
                }
                if verdict == Verdict::Fail {
                    return Ok(ScenarioReport {
                        name: spec.name.clone(),
                        verdict: Verdict::Fail,
                        message,
                        steps: records,
                        wall_clock: started.elapsed(),
                        cancelled: false,
                    });
                }
            }
        }
    }

    Ok(ScenarioReport {
        name: spec.name.clone(),
        verdict: Verdict::Pass,
        message: format!("{} step(s) passed", records.len()),
        steps: records,
        wall_clock: started.elapsed(),
        cancelled: false,
    })
}

fn cancelled_report(spec: &ScenarioSpec, steps: Vec<StepRecord>, started: Instant) -> ScenarioReport {
    ScenarioReport {
        name: spec.name.clone(),
        verdict: Verdict::Fail,
        message: format!("cancelled after {} step(s)", steps.len()),
        steps,
        wall_clock: started.elapsed(),
        cancelled: true,
    }
}
