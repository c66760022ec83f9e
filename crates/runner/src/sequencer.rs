//! Suite sequencer -- runs scenarios in order and halts on the first failure.
//!
//! # Run order
//!
//! ```text
//! scenario 1 → cooldown → scenario 2 → cooldown → … → scenario K
//!      │                       │
//!      └── FAIL / launch failure / cancel ──▶ halt, remaining scenarios skipped
//! ```
//!
//! Exactly one step runs at a time. The sequencer never retries a scenario
//! and never cleans up the component's on-disk state after a failure.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use volsuite_core::verdict::Verdict;

use crate::process::StepExecutor;
use crate::registry::Selection;
use crate::result::{HaltReason, ScenarioEntry, SuiteRecorder, SuiteResult};
use crate::scenario::{ScenarioSpec, run_scenario};

/// Sequential scenario driver.
pub struct SuiteSequencer<E: StepExecutor> {
    executor: E,
    cancel: CancellationToken,
}

impl<E: StepExecutor> SuiteSequencer<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to stop the run between steps.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs a resolved registry selection.
    pub async fn run_selection(&self, selection: &Selection) -> SuiteResult {
        self.run_suite(&selection.name, &selection.scenarios).await
    }

    /// Runs `scenarios` strictly in order.
    ///
    /// The cooldown of a completed scenario is observed before the next one
    /// starts; there is no cooldown after the last scenario or after a halt.
    pub async fn run_suite(&self, name: &str, scenarios: &[ScenarioSpec]) -> SuiteResult {
        let mut recorder = SuiteRecorder::new(name, scenarios.len());
        info!(
            suite = name,
            run_id = recorder.run_id(),
            scenarios = scenarios.len(),
            "suite started"
        );

        for (index, spec) in scenarios.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(suite = name, "suite cancelled before scenario '{}'", spec.name);
                recorder.halt(HaltReason::Cancelled);
                break;
            }

            info!(
                scenario = %spec.name,
                position = index + 1,
                total = scenarios.len(),
                "scenario started: {}",
                spec.description
            );

            match run_scenario(&self.executor, spec, &self.cancel).await {
                Ok(report) => {
                    let verdict = report.verdict;
                    let cancelled = report.cancelled;
                    let wall_clock_secs = report.wall_clock.as_secs();
                    recorder.record(ScenarioEntry::from(report));

                    if cancelled {
                        warn!(scenario = %spec.name, "scenario cancelled");
                        recorder.halt(HaltReason::Cancelled);
                        break;
                    }
                    if verdict == Verdict::Fail {
                        error!(scenario = %spec.name, wall_clock_secs, "scenario failed, halting suite");
                        recorder.halt(HaltReason::ScenarioFailed {
                            scenario: spec.name.clone(),
                        });
                        break;
                    }
                    info!(scenario = %spec.name, wall_clock_secs, "scenario passed");
                }
                Err(e) => {
                    error!(scenario = %spec.name, error = %e, "launch failure, aborting run");
                    recorder.record(ScenarioEntry {
                        name: spec.name.clone(),
                        verdict: Verdict::Fail,
                        message: format!("launch failure: {e}"),
                        wall_clock: std::time::Duration::ZERO,
                        steps: Vec::new(),
                    });
                    recorder.halt(HaltReason::LaunchFailure {
                        scenario: spec.name.clone(),
                        error: e.to_string(),
                    });
                    break;
                }
            }

            let is_last = index + 1 == scenarios.len();
            if !is_last && !spec.cooldown.is_zero() {
                debug!(
                    scenario = %spec.name,
                    cooldown_secs = spec.cooldown.as_secs(),
                    "cooling down"
                );
                tokio::select! {
                    () = tokio::time::sleep(spec.cooldown) => {}
                    () = self.cancel.cancelled() => {}
                }
            }
        }

        let result = recorder.finish();
        info!(
            suite = name,
            success = result.success(),
            passed = result.passed(),
            planned = result.planned(),
            "suite finished"
        );
        result
    }
}
