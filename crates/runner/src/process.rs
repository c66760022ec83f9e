//! Process runner -- launches the component under test and reports how it ended.
//!
//! The [`StepExecutor`] trait is the seam between orchestration and the
//! operating system. [`ProcessRunner`] is the production implementation; the
//! sequencer and recovery loop are generic over the trait so tests can drive
//! them with scripted outcomes.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐      ┌──────────────────┐
//! │ SuiteSequencer │─────▶│  StepExecutor    │ (trait)
//! │ RecoveryLoop   │      └──────────────────┘
//! └────────────────┘          │          │
//!                             ▼          ▼
//!                     ProcessRunner   test doubles
//!                             │
//!                             ▼
//!                   test_volume / test_load
//! ```
//!
//! The child's stdout/stderr are inherited so operators see the component's
//! own output; the runner never parses it.

use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, info, warn};

use volsuite_core::config::BinariesConfig;
use volsuite_core::error::LaunchError;
use volsuite_core::outcome::Outcome;
use volsuite_core::step::Step;

/// Runs one [`Step`] to completion.
///
/// Implementations block the calling task until the step's process has
/// exited, been killed by a signal, or exceeded its time budget. A process
/// that could not be started at all is a [`LaunchError`], never an
/// [`Outcome`].
pub trait StepExecutor: Send + Sync {
    /// Executes the step and reports its termination.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the executable is missing, not
    /// executable, or its exit status cannot be collected.
    fn execute(&self, step: &Step) -> impl Future<Output = Result<Outcome, LaunchError>> + Send;
}

/// Production executor backed by `tokio::process`.
///
/// Children are spawned with `kill_on_drop(true)`, so dropping an in-flight
/// execution never leaves a second instance of the component running.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    binaries: BinariesConfig,
}

impl ProcessRunner {
    /// Creates a runner resolving executables against `binaries`.
    pub fn new(binaries: BinariesConfig) -> Self {
        Self { binaries }
    }

    /// Resolved program path and rendered arguments for a step.
    pub fn command_line(&self, step: &Step) -> (PathBuf, Vec<String>) {
        (self.binaries.resolve(step.executable), step.args.render())
    }
}

impl StepExecutor for ProcessRunner {
    async fn execute(&self, step: &Step) -> Result<Outcome, LaunchError> {
        let (path, args) = self.command_line(step);

        info!(
            step = %step.label,
            binary = %path.display(),
            args = %args.join(" "),
            time_budget_secs = step.time_budget.map(|b| b.as_secs()),
            "launching step"
        );

        let started = Instant::now();
        let mut child = Command::new(&path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::from_spawn(path.clone(), &e))?;

        let waited = match step.time_budget {
            Some(budget) => tokio::time::timeout(budget, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        match waited {
            Some(Ok(status)) => {
                let outcome = outcome_from_status(status, started.elapsed());
                debug!(step = %step.label, outcome = %outcome, "step process finished");
                Ok(outcome)
            }
            Some(Err(e)) => Err(LaunchError::Wait {
                path,
                reason: e.to_string(),
            }),
            None => {
                warn!(
                    step = %step.label,
                    elapsed_secs = started.elapsed().as_secs(),
                    "time budget exceeded, killing step process"
                );
                if let Err(e) = child.kill().await {
                    warn!(step = %step.label, error = %e, "failed to kill timed-out process");
                }
                Ok(Outcome::timed_out(started.elapsed()))
            }
        }
    }
}

fn outcome_from_status(status: ExitStatus, elapsed: Duration) -> Outcome {
    match status.code() {
        Some(code) => Outcome::exited(code, elapsed),
        None => Outcome::signaled(termination_signal(&status), elapsed),
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
