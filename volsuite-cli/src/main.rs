//! volsuite -- fault-injection regression runner for the volume engine.
//!
//! ```text
//! volsuite -t nightly -d ./build/bin
//! volsuite -t one-disk-replace --output json
//! volsuite --list
//! ```

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use volsuite_core::config::VolsuiteConfig;
use volsuite_runner::catalogue;

use crate::cli::Cli;
use crate::commands::run::RunOptions;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Config file picked up from the working directory when `-c` is absent.
const DEFAULT_CONFIG_FILE: &str = "volsuite.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli).await?;

    if let Err(e) = logging::init_tracing(&config.general, cli.log_level.as_deref()) {
        return Err(CliError::Config(e.to_string()));
    }

    let registry = catalogue::load(&config.suite).await?;
    let writer = OutputWriter::new(cli.output);

    if cli.list {
        return commands::list::execute(&registry, &writer);
    }

    let Some(selector) = cli.test_suits.as_deref() else {
        return Err(CliError::Config(
            "no scenario or suite selected (use -t/--test_suits)".to_owned(),
        ));
    };

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    commands::run::execute(
        RunOptions {
            selector,
            notify: !cli.no_notify,
        },
        &config,
        &registry,
        &writer,
        cancel,
    )
    .await
}

/// File, then env overrides, then CLI flags.
async fn load_config(cli: &Cli) -> Result<VolsuiteConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => VolsuiteConfig::load(path).await?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            VolsuiteConfig::load(DEFAULT_CONFIG_FILE).await?
        }
        None => VolsuiteConfig::from_env()?,
    };

    if let Some(dir) = &cli.dirpath {
        config.binaries.dir = binaries_dir(dir)?;
    }
    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }
    config.validate()?;
    Ok(config)
}

fn binaries_dir(dir: &Path) -> Result<PathBuf, CliError> {
    if !dir.is_dir() {
        return Err(CliError::Config(format!(
            "binaries directory '{}' does not exist",
            dir.display()
        )));
    }
    Ok(dir.to_path_buf())
}

/// Cancel the run on Ctrl-C. The step in flight is allowed to finish.
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, stopping after the current step");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });
}
