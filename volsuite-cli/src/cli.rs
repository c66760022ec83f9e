//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// volsuite -- fault-injection regression suites for the volume engine.
///
/// Runs one scenario or a named suite of scenarios against the volume test
/// binaries, stopping at the first failing scenario.
#[derive(Parser, Debug)]
#[command(name = "volsuite", version, about, long_about = None)]
pub struct Cli {
    /// Scenario or suite to run (e.g. nightly, one_disk_replace).
    #[arg(short = 't', long = "test_suits", required_unless_present = "list")]
    pub test_suits: Option<String>,

    /// Directory containing the test executables.
    #[arg(short = 'd', long = "dirpath")]
    pub dirpath: Option<PathBuf>,

    /// Path to the volsuite.toml configuration file.
    ///
    /// Defaults to ./volsuite.toml when present, built-in defaults otherwise.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Output format for the suite result.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// List registered suites and scenarios, then exit.
    #[arg(long)]
    pub list: bool,

    /// Skip result notification for this run.
    #[arg(long)]
    pub no_notify: bool,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_short_flags() {
        let cli = Cli::try_parse_from(["volsuite", "-t", "nightly", "-d", "/opt/bin"])
            .expect("parse succeeded");
        assert_eq!(cli.test_suits.as_deref(), Some("nightly"));
        assert_eq!(cli.dirpath, Some(PathBuf::from("/opt/bin")));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(!cli.list);
        assert!(!cli.no_notify);
    }

    #[test]
    fn test_cli_parse_long_flags() {
        let cli = Cli::try_parse_from([
            "volsuite",
            "--test_suits",
            "one_disk_replace",
            "--dirpath",
            "./build",
            "--config",
            "ci.toml",
            "--log-level",
            "debug",
            "--output",
            "json",
            "--no-notify",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.test_suits.as_deref(), Some("one_disk_replace"));
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.no_notify);
    }

    #[test]
    fn test_cli_requires_selector_unless_list() {
        assert!(Cli::try_parse_from(["volsuite"]).is_err());

        let cli = Cli::try_parse_from(["volsuite", "--list"]).expect("parse succeeded");
        assert!(cli.list);
        assert!(cli.test_suits.is_none());
    }

    #[test]
    fn test_cli_rejects_unknown_output_format() {
        let result = Cli::try_parse_from(["volsuite", "-t", "load", "--output", "yaml"]);
        assert!(result.is_err(), "yaml is not a supported output format");
    }

    #[test]
    fn test_cli_command_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
