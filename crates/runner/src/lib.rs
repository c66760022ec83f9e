#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`process`]: Process runner (`StepExecutor` trait, `ProcessRunner`)
//! - [`scenario`]: Scenario model and single-scenario execution (`ScenarioSpec`, `run_scenario`)
//! - [`recovery`]: Recovery loop controller (`RecoveryCycleSpec`, `RecoveryLoop`)
//! - [`registry`]: Named scenarios and suites (`ScenarioRegistry`)
//! - [`catalogue`]: TOML catalogue loading, including the built-in catalogue
//! - [`sequencer`]: Suite sequencer (`SuiteSequencer`)
//! - [`result`]: Suite result and summary (`SuiteResult`)
//! - [`notify`]: Summary delivery (`Notifier` trait, `LogNotifier`, `CommandNotifier`)
//!
//! # Architecture
//!
//! ```text
//! catalogue.toml --> ScenarioRegistry.resolve(selector)
//!                          |
//!                    SuiteSequencer.run_suite()
//!                          |
//!             run_scenario() / RecoveryLoop.run()
//!                          |
//!                 StepExecutor.execute() --> test_volume / test_load
//!                          |
//!                    SuiteResult --> Notifier
//! ```

pub mod catalogue;
pub mod notify;
pub mod process;
pub mod recovery;
pub mod registry;
pub mod result;
pub mod scenario;
pub mod sequencer;

#[cfg(test)]
mod testing;

// --- Public API Re-exports ---

// Process runner
pub use process::{ProcessRunner, StepExecutor};

// Scenarios
pub use recovery::{RecoveryCycleSpec, RecoveryLoop, RecoveryReport, RecoveryState};
pub use scenario::{ScenarioReport, ScenarioSpec, ScenarioStep, StepRecord, run_scenario};

// Registry & catalogue
pub use catalogue::{BUILTIN_CATALOGUE, CatalogueSettings, NIGHTLY_SUITE};
pub use registry::{ScenarioRegistry, Selection, SuiteDefinition};

// Sequencing & results
pub use result::{HaltReason, ScenarioEntry, SuiteRecorder, SuiteResult};
pub use sequencer::SuiteSequencer;

// Notification
pub use notify::{CommandNotifier, LogNotifier, Notifier};
