//! Result notification -- hands the suite summary to an external channel.
//!
//! Delivery is best effort: a failed notification is logged at warn and
//! never changes the outcome of the run.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use volsuite_core::error::NotifyError;

/// Delivers a plain-text suite summary.
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Sends `summary`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the channel rejected or never received
    /// the message.
    fn notify(&self, summary: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Emits the summary through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, summary: &str) -> Result<(), NotifyError> {
        for line in summary.lines() {
            info!(target: "volsuite::summary", "{line}");
        }
        Ok(())
    }
}

/// Runs a configured command with the summary as its last argument.
///
/// The command is executed directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a notifier from an argv prefix; `None` when it is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Notifier for CommandNotifier {
    fn name(&self) -> &str {
        &self.program
    }

    async fn notify(&self, summary: &str) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(summary)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| NotifyError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(NotifyError::NonZeroExit {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Sends `summary` and logs a failure instead of returning it.
///
/// Returns whether delivery succeeded.
pub async fn deliver<N: Notifier>(notifier: &N, summary: &str) -> bool {
    match notifier.notify(summary).await {
        Ok(()) => {
            info!(notifier = notifier.name(), "suite summary delivered");
            true
        }
        Err(e) => {
            warn!(notifier = notifier.name(), error = %e, "failed to deliver suite summary");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_builds_no_notifier() {
        assert!(CommandNotifier::from_command(&[]).is_none());
    }

    #[test]
    fn command_splits_program_and_prefix_args() {
        let command = vec!["mail".to_owned(), "-s".to_owned(), "volsuite".to_owned()];
        let notifier = CommandNotifier::from_command(&command).unwrap();
        assert_eq!(notifier.program(), "mail");
        assert_eq!(notifier, CommandNotifier::new("mail", vec!["-s".into(), "volsuite".into()]));
    }

    #[tokio::test]
    async fn log_notifier_always_delivers() {
        assert!(deliver(&LogNotifier, "suite 'nightly' PASSED (10/10 scenarios passed)").await);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let notifier = CommandNotifier::new("/nonexistent/volsuite-notify", Vec::new());
        let err = notifier.notify("summary").await.unwrap_err();
        assert!(matches!(err, NotifyError::Spawn { .. }));
        assert!(!deliver(&notifier, "summary").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let notifier = CommandNotifier::new("false", Vec::new());
        let err = notifier.notify("summary").await.unwrap_err();
        assert!(matches!(err, NotifyError::NonZeroExit { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn summary_is_last_argument() {
        // sh -c 'test "$1" = "done"' sh <summary>
        let notifier = CommandNotifier::new(
            "sh",
            vec!["-c".into(), r#"test "$1" = "done""#.into(), "sh".into()],
        );
        notifier.notify("done").await.unwrap();
        assert!(notifier.notify("other").await.is_err());
    }
}
