//! Consistency checks over one adventure.
//!
//! Nothing here is enforced at write time. Validation reports what would
//! make the adventure fail or degrade at play time.

use std::collections::HashMap;

use wf_core::{AdventureId, CopyKey, Location, ScriptId};

use crate::engine::Engine;
use crate::error::EngineResult;

/// A warning or error found while validating an adventure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// What the issue was found on, e.g. `location 'Cave'`.
    pub subject: String,
    /// What is wrong.
    pub message: String,
    /// Whether this is an error (true) or a warning (false).
    pub is_error: bool,
}

impl ValidationIssue {
    fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            is_error: true,
        }
    }

    fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            is_error: false,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{level}: {}: {}", self.subject, self.message)
    }
}

impl Engine {
    /// Check an adventure for problems that would surface during play.
    pub async fn validate_adventure(&self, adventure: AdventureId) -> EngineResult<Vec<ValidationIssue>> {
        let adventure = self.adventure(adventure).await?;
        let locations = self.stores.locations.list_for_adventure(adventure.id).await?;
        let scripts = self.stores.scripts.list_for_adventure(adventure.id).await?;
        let names: HashMap<ScriptId, &str> = scripts.iter().map(|s| (s.id, s.name.as_str())).collect();
        let mut issues = Vec::new();

        let subject = format!("adventure '{}'", adventure.name);
        match locations.iter().filter(|l| l.initial).count() {
            0 => issues.push(ValidationIssue::error(&subject, "no initial location")),
            1 => {}
            n => issues.push(ValidationIssue::error(&subject, format!("{n} initial locations"))),
        }
        for (slot, script) in [
            ("init script", adventure.init_script_id),
            ("termination script", adventure.termination_script_id),
        ] {
            check_script(&subject, slot, script, &names, &mut issues);
        }

        let places: HashMap<_, &Location> = locations.iter().map(|l| (l.id, l)).collect();
        for location in &locations {
            let subject = format!("location '{}'", location.name);
            check_script(&subject, "enter script", location.enter_script_id, &names, &mut issues);
            check_script(&subject, "exit script", location.exit_script_id, &names, &mut issues);

            for route in self.stores.routes.list_from(location.id).await? {
                let subject = format!("route '{}'", route.name);
                if !places.contains_key(&route.destination_id) {
                    issues.push(ValidationIssue::error(
                        &subject,
                        format!("destination {} is not a location of this adventure", route.destination_id),
                    ));
                }
                check_script(&subject, "route script", route.route_taken_script_id, &names, &mut issues);
            }
        }

        for script in &scripts {
            for edge in self.includes.edges(script.id).await? {
                if !names.contains_key(&edge.includes_id) {
                    issues.push(ValidationIssue::error(
                        format!("script '{}'", script.name),
                        format!("includes {}, which is not a script of this adventure", edge.includes_id),
                    ));
                }
            }
        }
        for cycle in self.includes.find_cycles(&scripts).await? {
            let path: Vec<&str> = cycle
                .iter()
                .map(|id| names.get(id).copied().unwrap_or("?"))
                .collect();
            issues.push(ValidationIssue::warning(
                format!("script '{}'", path.first().copied().unwrap_or("?")),
                format!("include cycle through {}", path.join(", ")),
            ));
        }

        for language in self.stores.languages.list().await? {
            if self.stores.copies.find(CopyKey::EMPTY, &language.code).await?.is_none() {
                issues.push(ValidationIssue::warning(
                    format!("language '{}'", language.code),
                    "no placeholder copy; missing text will render empty",
                ));
            }
        }

        Ok(issues)
    }
}

fn check_script(
    subject: &str,
    slot: &str,
    script: Option<ScriptId>,
    names: &HashMap<ScriptId, &str>,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(id) = script.filter(|id| !names.contains_key(id)) {
        issues.push(ValidationIssue::error(
            subject,
            format!("{slot} {id} is not a script of this adventure"),
        ));
    }
}
