//! Scripted executor for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use volsuite_core::error::LaunchError;
use volsuite_core::outcome::Outcome;
use volsuite_core::step::Step;

use crate::process::StepExecutor;

/// Returns queued outcomes in order, then per-label defaults, then a clean exit.
#[derive(Default)]
pub struct ScriptedExecutor {
    queue: Mutex<VecDeque<Outcome>>,
    defaults: HashMap<String, Outcome>,
    launch_failures: HashSet<String>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.queue.lock().unwrap().extend(outcomes);
        self
    }

    pub fn with_default_for(mut self, label: &str, outcome: Outcome) -> Self {
        self.defaults.insert(label.to_owned(), outcome);
        self
    }

    pub fn with_launch_failure(mut self, label: &str) -> Self {
        self.launch_failures.insert(label.to_owned());
        self
    }

    pub fn invocations(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn timestamps(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

impl StepExecutor for ScriptedExecutor {
    async fn execute(&self, step: &Step) -> Result<Outcome, LaunchError> {
        self.calls
            .lock()
            .unwrap()
            .push((step.label.clone(), Instant::now()));
        if self.launch_failures.contains(&step.label) {
            return Err(LaunchError::NotFound {
                path: PathBuf::from(format!("./{}", step.label)),
            });
        }
        if let Some(outcome) = self.queue.lock().unwrap().pop_front() {
            return Ok(outcome);
        }
        Ok(self
            .defaults
            .get(&step.label)
            .copied()
            .unwrap_or_else(|| Outcome::exited(0, Duration::from_millis(10))))
    }
}
