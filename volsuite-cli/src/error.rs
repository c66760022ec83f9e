//! CLI-specific error types and exit code mapping

use volsuite_core::error::VolsuiteError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to the process exit status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The suite ran and at least one scenario failed or could not start.
    #[error("{0}")]
    SuiteFailed(String),

    /// The run was interrupted by Ctrl-C.
    #[error("cancelled by user")]
    Cancelled,

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from volsuite-core.
    #[error("{0}")]
    Core(#[from] VolsuiteError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                        |
    /// |------|------------------------------------------------|
    /// | 0    | Success                                        |
    /// | 1    | Scenario failure or launch failure             |
    /// | 2    | Configuration or registry error                |
    /// | 10   | IO error                                       |
    /// | 130  | Cancelled by Ctrl-C                            |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Cancelled => 130,
            Self::Core(e) => match e {
                VolsuiteError::Config(_) | VolsuiteError::Registry(_) => 2,
                VolsuiteError::Io(_) => 10,
            },
            Self::SuiteFailed(_) | Self::JsonSerialize(_) => 1,
        }
    }
}
