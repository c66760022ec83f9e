//! `volsuite --list` handler

use std::io::Write;

use serde::Serialize;

use volsuite_runner::ScenarioRegistry;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Print every registered suite and scenario.
pub fn execute(registry: &ScenarioRegistry, writer: &OutputWriter) -> Result<(), CliError> {
    writer.render(&CatalogueListing::from_registry(registry))
}

#[derive(Serialize)]
pub struct CatalogueListing {
    pub suites: Vec<SuiteListing>,
    pub scenarios: Vec<ScenarioListing>,
}

#[derive(Serialize)]
pub struct SuiteListing {
    pub name: String,
    pub description: String,
    pub scenarios: Vec<String>,
}

#[derive(Serialize)]
pub struct ScenarioListing {
    pub name: String,
    pub description: String,
    pub steps: usize,
    pub max_invocations: usize,
    pub cooldown_secs: u64,
}

impl CatalogueListing {
    pub fn from_registry(registry: &ScenarioRegistry) -> Self {
        Self {
            suites: registry
                .suites()
                .map(|s| SuiteListing {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    scenarios: s.scenarios.clone(),
                })
                .collect(),
            scenarios: registry
                .scenarios()
                .map(|s| ScenarioListing {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    steps: s.steps.len(),
                    max_invocations: s.max_invocations(),
                    cooldown_secs: s.cooldown.as_secs(),
                })
                .collect(),
        }
    }
}

impl Render for CatalogueListing {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Suites".bold())?;
        for suite in &self.suites {
            writeln!(w, "  {:<24} {}", suite.name.cyan(), suite.description)?;
            writeln!(w, "  {:<24} {}", "", suite.scenarios.join(" → "))?;
        }
        writeln!(w)?;

        writeln!(w, "{}", "Scenarios".bold())?;
        writeln!(
            w,
            "  {:<24} {:<6} {:<8} Description",
            "Name", "Steps", "Max runs"
        )?;
        writeln!(w, "  {}", "-".repeat(78))?;
        for s in &self.scenarios {
            writeln!(
                w,
                "  {:<24} {:<6} {:<8} {}",
                s.name, s.steps, s.max_invocations, s.description
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use volsuite_runner::{CatalogueSettings, catalogue};

    use super::*;

    fn listing() -> CatalogueListing {
        let registry = catalogue::builtin(&CatalogueSettings::default()).expect("builtin catalogue");
        CatalogueListing::from_registry(&registry)
    }

    #[test]
    fn test_listing_contains_builtin_catalogue() {
        let listing = listing();
        assert_eq!(listing.suites.len(), 1);
        assert_eq!(listing.suites[0].name, "nightly");
        assert_eq!(listing.scenarios.len(), 11);

        let recovery = listing
            .scenarios
            .iter()
            .find(|s| s.name == "recovery_nightly")
            .expect("recovery_nightly listed");
        // 10 verify + 9 abort + 1 final
        assert_eq!(recovery.max_invocations, 20);
    }

    #[test]
    fn test_listing_text_render() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        listing()
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Suites"));
        assert!(output.contains("one_disk_replace_abort"));
        assert!(output.contains("load → normal → recovery_nightly"));
    }
}
