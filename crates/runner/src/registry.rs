//! Scenario registry -- named scenarios and suites, validated on insertion.
//!
//! Scenario and suite names share one namespace. Lookups treat `-` and `_`
//! as the same character, so `one-disk-replace` selects `one_disk_replace`.

use std::collections::BTreeMap;

use tracing::debug;

use volsuite_core::error::RegistryError;

use crate::scenario::{ScenarioSpec, ScenarioStep};

/// A named, ordered group of scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteDefinition {
    pub name: String,
    pub description: String,
    /// Member scenario names, in run order.
    pub scenarios: Vec<String>,
}

/// What a selector resolved to: one scenario, or a suite's members.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Registered name of the scenario or suite.
    pub name: String,
    pub scenarios: Vec<ScenarioSpec>,
}

fn normalize(name: &str) -> String {
    name.trim().replace('-', "_")
}

/// Validated collection of scenarios and suites.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    scenarios: BTreeMap<String, ScenarioSpec>,
    suites: BTreeMap<String, SuiteDefinition>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_taken(&self, key: &str) -> bool {
        self.scenarios.contains_key(key) || self.suites.contains_key(key)
    }

    /// Adds a scenario.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names, scenarios without steps and invalid recovery
    /// loops.
    pub fn register(&mut self, spec: ScenarioSpec) -> Result<(), RegistryError> {
        let key = normalize(&spec.name);
        if self.is_taken(&key) {
            return Err(RegistryError::DuplicateName(spec.name));
        }
        if spec.steps.is_empty() {
            return Err(RegistryError::EmptyScenario(spec.name));
        }
        for step in &spec.steps {
            if let ScenarioStep::RecoveryLoop(cycle) = step {
                cycle.validate(&spec.name)?;
            }
        }

        debug!(scenario = %spec.name, steps = spec.steps.len(), "scenario registered");
        self.scenarios.insert(key, spec);
        Ok(())
    }

    /// Adds a suite. Every member must already be registered.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names and unknown members.
    pub fn register_suite(&mut self, suite: SuiteDefinition) -> Result<(), RegistryError> {
        let key = normalize(&suite.name);
        if self.is_taken(&key) {
            return Err(RegistryError::DuplicateName(suite.name));
        }
        if let Some(member) = suite
            .scenarios
            .iter()
            .find(|m| !self.scenarios.contains_key(&normalize(m)))
        {
            return Err(RegistryError::UnknownSuiteMember {
                suite: suite.name.clone(),
                member: member.clone(),
            });
        }

        debug!(suite = %suite.name, members = suite.scenarios.len(), "suite registered");
        self.suites.insert(key, suite);
        Ok(())
    }

    /// Looks up a single scenario.
    pub fn get(&self, name: &str) -> Option<&ScenarioSpec> {
        self.scenarios.get(&normalize(name))
    }

    pub fn suite(&self, name: &str) -> Option<&SuiteDefinition> {
        self.suites.get(&normalize(name))
    }

    /// Resolves a scenario or suite name into the scenarios to run.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownScenario`] listing every known name.
    pub fn resolve(&self, selector: &str) -> Result<Selection, RegistryError> {
        let key = normalize(selector);

        if let Some(spec) = self.scenarios.get(&key) {
            return Ok(Selection {
                name: spec.name.clone(),
                scenarios: vec![spec.clone()],
            });
        }

        if let Some(suite) = self.suites.get(&key) {
            let scenarios = suite
                .scenarios
                .iter()
                .filter_map(|member| self.scenarios.get(&normalize(member)).cloned())
                .collect();
            return Ok(Selection {
                name: suite.name.clone(),
                scenarios,
            });
        }

        Err(RegistryError::UnknownScenario {
            name: selector.to_owned(),
            known: self.known_names(),
        })
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioSpec> {
        self.scenarios.values()
    }

    pub fn suites(&self) -> impl Iterator<Item = &SuiteDefinition> {
        self.suites.values()
    }

    /// Every registered suite and scenario name, sorted.
    pub fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .suites
            .values()
            .map(|s| s.name.clone())
            .chain(self.scenarios.values().map(|s| s.name.clone()))
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
