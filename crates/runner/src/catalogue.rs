//! Scenario catalogue -- TOML documents that populate a [`ScenarioRegistry`].
//!
//! The built-in catalogue is embedded at compile time; an operator may point
//! `suite.catalogue` at a file with the same layout. Both are validated the
//! same way before anything runs.
//!
//! ```toml
//! [[scenario]]
//! name = "one_disk_fail"
//! description = "fail one disk under I/O"
//!
//! [[scenario.step]]
//! kind = "run"
//! binary = "volume_test"
//! args = { gtest_filter = "IOTest.one_disk_fail_test", run_time = 300 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use volsuite_core::config::SuiteConfig;
use volsuite_core::error::{ConfigError, RegistryError, VolsuiteError};
use volsuite_core::step::{ArgumentSet, Executable, ExpectedOutcome, Step};

use crate::recovery::RecoveryCycleSpec;
use crate::registry::{ScenarioRegistry, SuiteDefinition};
use crate::scenario::ScenarioSpec;

/// Embedded default catalogue.
pub const BUILTIN_CATALOGUE: &str = include_str!("../catalogue.toml");

/// Name of the built-in suite that runs every nightly scenario.
pub const NIGHTLY_SUITE: &str = "nightly";

/// Settings applied while turning catalogue entries into scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueSettings {
    /// Cooldown for scenarios that do not declare their own.
    pub default_cooldown: Duration,
    /// Added to a step's `run_time` flag to derive its time budget.
    pub time_budget_grace: Option<Duration>,
}

impl CatalogueSettings {
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            default_cooldown: config.cooldown(),
            time_budget_grace: config.time_budget_grace(),
        }
    }
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self::from_config(&SuiteConfig::default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogueDef {
    #[serde(default)]
    suite: Vec<SuiteDef>,
    #[serde(default)]
    scenario: Vec<ScenarioDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteDef {
    name: String,
    #[serde(default)]
    description: String,
    scenarios: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioDef {
    name: String,
    #[serde(default)]
    description: String,
    cooldown_secs: Option<u64>,
    #[serde(default)]
    step: Vec<StepEntryDef>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StepEntryDef {
    Run(StepDef),
    RecoveryLoop(RecoveryLoopDef),
}

#[derive(Debug, Deserialize)]
struct StepDef {
    label: Option<String>,
    binary: Executable,
    #[serde(default = "default_expect")]
    expect: ExpectedOutcome,
    #[serde(default)]
    args: ArgumentSet,
    time_budget_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RecoveryLoopDef {
    iterations: u32,
    verify: StepDef,
    abort: StepDef,
    final_verify: StepDef,
}

fn default_expect() -> ExpectedOutcome {
    ExpectedOutcome::MustSucceed
}

impl StepDef {
    fn into_step(self, settings: &CatalogueSettings) -> Step {
        let label = self.label.unwrap_or_else(|| {
            self.args
                .get("gtest_filter")
                .map(ToString::to_string)
                .unwrap_or_else(|| self.binary.to_string())
        });

        let budget = match self.time_budget_secs {
            Some(secs) => Some(Duration::from_secs(secs)),
            None => derived_budget(&self.args, settings.time_budget_grace),
        };

        let mut step = Step::new(label, self.binary).expect(self.expect);
        step.args = self.args;
        step.time_budget = budget;
        step
    }
}

/// `run_time + grace` for steps carrying a non-negative integer `run_time`.
///
/// A sum past `Duration::MAX` leaves the step unbounded.
fn derived_budget(args: &ArgumentSet, grace: Option<Duration>) -> Option<Duration> {
    let grace = grace?;
    let run_time = args.get("run_time")?.as_int()?;
    let run_time = u64::try_from(run_time).ok()?;
    Duration::from_secs(run_time).checked_add(grace)
}

/// Registry built from the embedded catalogue.
///
/// # Errors
///
/// Only fails if the embedded document itself is invalid.
pub fn builtin(settings: &CatalogueSettings) -> Result<ScenarioRegistry, RegistryError> {
    parse(BUILTIN_CATALOGUE, settings)
}

/// Parses and validates a catalogue document.
///
/// # Errors
///
/// [`RegistryError::CatalogueParse`] for malformed TOML, or any registry
/// validation error.
pub fn parse(source: &str, settings: &CatalogueSettings) -> Result<ScenarioRegistry, RegistryError> {
    let def: CatalogueDef = toml::from_str(source).map_err(|e| RegistryError::CatalogueParse {
        reason: e.to_string(),
    })?;

    let mut registry = ScenarioRegistry::new();

    for scenario in def.scenario {
        let cooldown = scenario
            .cooldown_secs
            .map(Duration::from_secs)
            .unwrap_or(settings.default_cooldown);
        let mut spec = ScenarioSpec::new(scenario.name, scenario.description).cooldown(cooldown);

        for entry in scenario.step {
            spec = match entry {
                StepEntryDef::Run(step) => spec.step(step.into_step(settings)),
                StepEntryDef::RecoveryLoop(lp) => spec.recovery_loop(RecoveryCycleSpec::new(
                    lp.iterations,
                    lp.verify.into_step(settings),
                    lp.abort.into_step(settings),
                    lp.final_verify.into_step(settings),
                )),
            };
        }
        registry.register(spec)?;
    }

    for suite in def.suite {
        registry.register_suite(SuiteDefinition {
            name: suite.name,
            description: suite.description,
            scenarios: suite.scenarios,
        })?;
    }

    Ok(registry)
}

/// Reads a catalogue file.
///
/// # Errors
///
/// [`ConfigError::FileNotFound`] when the file does not exist, I/O errors,
/// and everything [`parse`] rejects.
pub async fn load_file(
    path: impl AsRef<Path>,
    settings: &CatalogueSettings,
) -> Result<ScenarioRegistry, VolsuiteError> {
    let path = path.as_ref();
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VolsuiteError::Config(ConfigError::FileNotFound {
                path: path.display().to_string(),
            })
        } else {
            VolsuiteError::Io(e)
        }
    })?;

    let registry = parse(&source, settings)?;
    info!(
        path = %path.display(),
        scenarios = registry.len(),
        "scenario catalogue loaded"
    );
    Ok(registry)
}

/// Loads the catalogue named by `config.catalogue`, or the built-in one.
///
/// # Errors
///
/// See [`load_file`].
pub async fn load(config: &SuiteConfig) -> Result<ScenarioRegistry, VolsuiteError> {
    let settings = CatalogueSettings::from_config(config);
    if config.catalogue.is_empty() {
        Ok(builtin(&settings)?)
    } else {
        load_file(&config.catalogue, &settings).await
    }
}
