use serde::{Deserialize, Serialize};

use crate::copy::CopyKey;
use crate::id::{AdventureId, LocationId, RouteId, ScriptId};

/// A place the player can be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier.
    pub id: LocationId,
    /// Owning adventure.
    pub adventure_id: AdventureId,
    /// Author-facing name.
    pub name: String,
    /// Copy shown when the player looks around.
    pub description: CopyKey,
    /// Games start here. A playable adventure has exactly one.
    pub initial: bool,
    /// Reaching this location ends the story.
    pub is_final: bool,
    /// Runs after a game arrives here.
    pub enter_script_id: Option<ScriptId>,
    /// Runs before a game leaves through a route.
    pub exit_script_id: Option<ScriptId>,
}

impl Location {
    /// Create a plain location with no scripts.
    pub fn new(adventure_id: AdventureId, name: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            adventure_id,
            name: name.into(),
            description: CopyKey::EMPTY,
            initial: false,
            is_final: false,
            enter_script_id: None,
            exit_script_id: None,
        }
    }

    /// Mark as the starting location.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Mark as an ending.
    pub fn final_location(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Set the description key.
    pub fn with_description(mut self, key: CopyKey) -> Self {
        self.description = key;
        self
    }

    /// Set the enter script.
    pub fn with_enter_script(mut self, script: ScriptId) -> Self {
        self.enter_script_id = Some(script);
        self
    }

    /// Set the exit script.
    pub fn with_exit_script(mut self, script: ScriptId) -> Self {
        self.exit_script_id = Some(script);
        self
    }

    /// Every script this location references.
    pub fn script_refs(&self) -> impl Iterator<Item = ScriptId> {
        self.enter_script_id.into_iter().chain(self.exit_script_id)
    }
}

/// A directed connection from one location to another. Self-loops are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique identifier.
    pub id: RouteId,
    /// Where the route leaves from.
    pub source_id: LocationId,
    /// Where the route arrives.
    pub destination_id: LocationId,
    /// Author-facing name, e.g. "go-north".
    pub name: String,
    /// Copy shown to the player when offering this route.
    pub label: CopyKey,
    /// Runs when the player takes this route, before leaving the source.
    pub route_taken_script_id: Option<ScriptId>,
}

impl Route {
    /// Create a route with no label and no script.
    pub fn new(source_id: LocationId, destination_id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id: RouteId::new(),
            source_id,
            destination_id,
            name: name.into(),
            label: CopyKey::EMPTY,
            route_taken_script_id: None,
        }
    }

    /// Set the label key.
    pub fn with_label(mut self, key: CopyKey) -> Self {
        self.label = key;
        self
    }

    /// Set the route-taken script.
    pub fn with_script(mut self, script: ScriptId) -> Self {
        self.route_taken_script_id = Some(script);
        self
    }

    /// Whether the route returns to its source.
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.destination_id
    }
}
