use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::copy::CopyKey;
use crate::id::{AdventureId, ScriptId};

/// A complete text adventure. Owns its locations and scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adventure {
    /// Unique identifier.
    pub id: AdventureId,
    /// Display name, shown in listings.
    pub name: String,
    /// Copy shown when a game starts.
    pub initial_text: CopyKey,
    /// Copy describing the adventure in listings.
    pub description: CopyKey,
    /// Runs once when a game starts, before the initial location is entered.
    pub init_script_id: Option<ScriptId>,
    /// Runs once when a game ends, before it is removed.
    pub termination_script_id: Option<ScriptId>,
    /// When the adventure was created.
    pub created_at: DateTime<Utc>,
}

impl Adventure {
    /// Create an adventure with no copy and no scripts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AdventureId::new(),
            name: name.into(),
            initial_text: CopyKey::EMPTY,
            description: CopyKey::EMPTY,
            init_script_id: None,
            termination_script_id: None,
            created_at: Utc::now(),
        }
    }

    /// Set the opening text key.
    pub fn with_initial_text(mut self, key: CopyKey) -> Self {
        self.initial_text = key;
        self
    }

    /// Set the description key.
    pub fn with_description(mut self, key: CopyKey) -> Self {
        self.description = key;
        self
    }

    /// Set the script run at game start.
    pub fn with_init_script(mut self, script: ScriptId) -> Self {
        self.init_script_id = Some(script);
        self
    }

    /// Set the script run at game end.
    pub fn with_termination_script(mut self, script: ScriptId) -> Self {
        self.termination_script_id = Some(script);
        self
    }

    /// Every script this adventure references directly.
    pub fn script_refs(&self) -> impl Iterator<Item = ScriptId> {
        self.init_script_id
            .into_iter()
            .chain(self.termination_script_id)
    }
}
