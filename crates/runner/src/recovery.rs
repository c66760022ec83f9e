//! Recovery loop controller -- repeated crash/replay cycles with a final full verification.
//!
//! # State machine
//!
//! ```text
//! Verifying(1) → AbortInjecting(1) → Verifying(2) → … → Verifying(N) → FinalFullVerify → Done
//! ```
//!
//! For `iteration_count = N` there are N verify runs, N-1 abort runs and one
//! final full verification. Verify and final runs are judged as
//! `MustSucceed` whatever their declared expectation; abort runs keep the
//! abort step's declared expectation. Any FAIL ends the loop at once and the
//! final verification is not attempted.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use volsuite_core::error::{LaunchError, RegistryError};
use volsuite_core::step::{ExpectedOutcome, Step};
use volsuite_core::verdict::Verdict;

use crate::process::StepExecutor;
use crate::scenario::{StepRecord, run_step};

/// Declarative description of a recovery loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryCycleSpec {
    /// Number of verify runs (at least 1).
    pub iteration_count: u32,
    /// Verify-only run with abrupt termination disabled.
    pub verify: Step,
    /// Run configured to abort mid-operation with verification disabled.
    pub abort: Step,
    /// Final run with full header and data verification.
    pub final_verify: Step,
}

impl RecoveryCycleSpec {
    pub fn new(iteration_count: u32, verify: Step, abort: Step, final_verify: Step) -> Self {
        Self {
            iteration_count,
            verify,
            abort,
            final_verify,
        }
    }

    /// Checks the loop is runnable; `scenario` names the owner in errors.
    pub fn validate(&self, scenario: &str) -> Result<(), RegistryError> {
        if self.iteration_count == 0 {
            return Err(RegistryError::InvalidRecoveryLoop {
                scenario: scenario.to_owned(),
                reason: "iteration count must be at least 1".to_owned(),
            });
        }
        if self.abort.expected == ExpectedOutcome::MustSucceed {
            return Err(RegistryError::InvalidRecoveryLoop {
                scenario: scenario.to_owned(),
                reason: "abort step cannot be expected to succeed".to_owned(),
            });
        }
        Ok(())
    }

    pub fn max_invocations(&self) -> usize {
        let n = self.iteration_count as usize;
        n + n.saturating_sub(1) + 1
    }
}

/// Position in the recovery loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Verifying { iteration: u32 },
    AbortInjecting { iteration: u32 },
    FinalFullVerify,
    Done,
}

impl RecoveryState {
    /// State after the current run passed.
    pub fn next(self, iteration_count: u32) -> Self {
        match self {
            Self::Verifying { iteration } if iteration < iteration_count => {
                Self::AbortInjecting { iteration }
            }
            Self::Verifying { .. } => Self::FinalFullVerify,
            Self::AbortInjecting { iteration } => Self::Verifying {
                iteration: iteration + 1,
            },
            Self::FinalFullVerify | Self::Done => Self::Done,
        }
    }
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verifying { iteration } => write!(f, "verify (iteration {iteration})"),
            Self::AbortInjecting { iteration } => write!(f, "abort injection (iteration {iteration})"),
            Self::FinalFullVerify => write!(f, "final full verify"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Outcome of a recovery loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    /// `Pass` only when the final verification passed.
    pub verdict: Verdict,
    pub message: String,
    /// Verify runs that passed.
    pub verified_iterations: u32,
    /// Abort runs that were judged as expected.
    pub aborts_injected: u32,
    /// State whose run failed, if any.
    pub failed_at: Option<RecoveryState>,
    pub cancelled: bool,
    pub steps: Vec<StepRecord>,
}

/// Drives one [`RecoveryCycleSpec`] through an executor.
pub struct RecoveryLoop<'a, E: StepExecutor> {
    executor: &'a E,
    spec: &'a RecoveryCycleSpec,
}

impl<'a, E: StepExecutor> RecoveryLoop<'a, E> {
    pub fn new(executor: &'a E, spec: &'a RecoveryCycleSpec) -> Self {
        Self { executor, spec }
    }

    fn step_for(&self, state: RecoveryState) -> Option<(&'a Step, ExpectedOutcome)> {
        match state {
            RecoveryState::Verifying { .. } => Some((&self.spec.verify, ExpectedOutcome::MustSucceed)),
            RecoveryState::AbortInjecting { .. } => Some((&self.spec.abort, self.spec.abort.expected)),
            RecoveryState::FinalFullVerify => {
                Some((&self.spec.final_verify, ExpectedOutcome::MustSucceed))
            }
            RecoveryState::Done => None,
        }
    }

    /// Runs the loop to `Done`, a failure, or cancellation.
    ///
    /// # Errors
    ///
    /// Returns the [`LaunchError`] of a run that could not be started.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RecoveryReport, LaunchError> {
        let total = self.spec.iteration_count;
        let mut state = RecoveryState::Verifying { iteration: 1 };
        let mut report = RecoveryReport {
            verdict: Verdict::Pass,
            message: String::new(),
            verified_iterations: 0,
            aborts_injected: 0,
            failed_at: None,
            cancelled: false,
            steps: Vec::new(),
        };

        while let Some((step, expected)) = self.step_for(state) {
            if cancel.is_cancelled() {
                report.verdict = Verdict::Fail;
                report.cancelled = true;
                report.message = format!("recovery loop cancelled before {state}");
                return Ok(report);
            }

            let record = run_step(self.executor, step, expected).await?;
            let verdict = record.verdict;
            let detail = record.detail.clone();
            report.steps.push(record);

            if verdict == Verdict::Fail {
                error!(state = %state, total_iterations = total, "recovery loop failed");
                report.verdict = Verdict::Fail;
                report.failed_at = Some(state);
                report.message = format!("recovery loop failed at {state}: {detail}");
                return Ok(report);
            }

            match state {
                RecoveryState::Verifying { iteration } => {
                    report.verified_iterations += 1;
                    info!(iteration, total_iterations = total, "recovery iteration verified");
                }
                RecoveryState::AbortInjecting { .. } => report.aborts_injected += 1,
                RecoveryState::FinalFullVerify | RecoveryState::Done => {}
            }
            state = state.next(total);
        }

        report.message = format!(
            "{} iteration(s) verified, {} abort(s) injected, final verification passed",
            report.verified_iterations, report.aborts_injected
        );
        Ok(report)
    }
}
