//! `volsuite -t <name>` handler

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::info;

use volsuite_core::config::{NotifyConfig, VolsuiteConfig};
use volsuite_core::error::VolsuiteError;
use volsuite_runner::notify::{self, CommandNotifier, LogNotifier};
use volsuite_runner::{HaltReason, ProcessRunner, ScenarioRegistry, SuiteResult, SuiteSequencer};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Options for one suite run.
pub struct RunOptions<'a> {
    pub selector: &'a str,
    pub notify: bool,
}

/// Resolve the selector, run it, render the result and notify.
///
/// Unknown selectors are rejected before any binary is launched.
pub async fn execute(
    options: RunOptions<'_>,
    config: &VolsuiteConfig,
    registry: &ScenarioRegistry,
    writer: &OutputWriter,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let selection = registry
        .resolve(options.selector)
        .map_err(|e| CliError::Core(VolsuiteError::from(e)))?;

    info!(
        selection = %selection.name,
        scenarios = selection.scenarios.len(),
        binaries_dir = %config.binaries.dir.display(),
        "starting suite run"
    );

    let sequencer =
        SuiteSequencer::new(ProcessRunner::new(config.binaries.clone())).with_cancellation(cancel);
    let result = sequencer.run_selection(&selection).await;

    writer.render(&result)?;

    if options.notify {
        send_summary(&config.notify, &result.summary()).await;
    }

    exit_status(&result)
}

/// Map a finished run onto the CLI's error space.
pub fn exit_status(result: &SuiteResult) -> Result<(), CliError> {
    match result.halt() {
        None if result.success() => Ok(()),
        Some(HaltReason::Cancelled) => Err(CliError::Cancelled),
        Some(reason) => Err(CliError::SuiteFailed(format!(
            "suite '{}' failed: {reason}",
            result.suite()
        ))),
        None => Err(CliError::SuiteFailed(format!(
            "suite '{}' failed",
            result.suite()
        ))),
    }
}

async fn send_summary(config: &NotifyConfig, summary: &str) {
    if config.enabled {
        if let Some(notifier) = CommandNotifier::from_command(&config.command) {
            notify::deliver(&notifier, summary).await;
            return;
        }
    }
    notify::deliver(&LogNotifier, summary).await;
}

impl Render for SuiteResult {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = if self.success() {
            "PASSED".green().bold()
        } else {
            "FAILED".red().bold()
        };
        writeln!(
            w,
            "Suite {}: {} ({}/{} scenarios passed)",
            self.suite().bold(),
            status,
            self.passed(),
            self.planned()
        )?;
        writeln!(w, "Run ID: {}", self.run_id())?;
        writeln!(w)?;

        writeln!(w, "{:<26} {:<8} {:>10}  Message", "Scenario", "Verdict", "Duration")?;
        writeln!(w, "{}", "-".repeat(90))?;
        for entry in self.entries() {
            let verdict = if entry.verdict.is_pass() {
                "PASS".green()
            } else {
                "FAIL".red()
            };
            writeln!(
                w,
                "{:<26} {:<8} {:>9}s  {}",
                entry.name,
                verdict,
                entry.wall_clock.as_secs(),
                entry.message
            )?;
        }

        if let Some(halt) = self.halt() {
            let skipped = self.planned().saturating_sub(self.entries().len());
            writeln!(w)?;
            writeln!(
                w,
                "{} {halt}; {skipped} scenario(s) not run",
                "Halted:".yellow()
            )?;
        }
        Ok(())
    }
}
