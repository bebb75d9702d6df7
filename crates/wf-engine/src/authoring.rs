//! Removals that keep dependent rows consistent.
//!
//! Creating and editing adventures goes straight through the ports. Removal
//! does not, because other rows point at what is being removed.

use std::collections::BTreeSet;

use tracing::info;
use wf_core::{AdventureId, Game, Location, LocationId, RouteId, ScriptId, ScriptIncludeId};

use crate::config::RemovalPolicy;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult, Missing};

impl Engine {
    /// Remove a script, clearing every reference to it.
    ///
    /// Adventure, location and route slots pointing at it are emptied, and
    /// its include edges are dropped in both directions.
    pub async fn remove_script(&self, script: ScriptId) -> EngineResult<()> {
        let script = self
            .stores
            .scripts
            .get(script)
            .await?
            .ok_or(EngineError::NotFound(Missing::Script(script)))?;
        let id = script.id;

        if let Some(mut adventure) = self.stores.adventures.get(script.adventure_id).await? {
            let before = adventure.clone();
            clear(&mut adventure.init_script_id, id);
            clear(&mut adventure.termination_script_id, id);
            if adventure != before {
                self.stores.adventures.save(&adventure).await?;
            }
        }

        for mut location in self.stores.locations.list_for_adventure(script.adventure_id).await? {
            let before = location.clone();
            clear(&mut location.enter_script_id, id);
            clear(&mut location.exit_script_id, id);
            if location != before {
                self.stores.locations.save(&location).await?;
            }
            for mut route in self.stores.routes.list_from(location.id).await? {
                if route.route_taken_script_id == Some(id) {
                    route.route_taken_script_id = None;
                    self.stores.routes.save(&route).await?;
                }
            }
        }

        self.drop_edges(id).await?;
        for entry in self.stores.copies.list_for_adventure(script.adventure_id).await? {
            if entry.script_id == Some(id) {
                self.stores.copies.remove(entry.id).await?;
            }
        }
        self.stores.scripts.remove(id).await?;
        info!(script = %id, name = %script.name, "script removed");
        Ok(())
    }

    /// Remove a location with its routes in and out.
    ///
    /// Games standing on it block the removal unless the policy cascades.
    pub async fn remove_location(&self, location: LocationId) -> EngineResult<()> {
        let location = self.location(location).await?;
        let games = self.stores.games.list_at_location(location.id).await?;
        self.clear_games(format!("location {}", location.id), games).await?;
        self.purge_location(&location).await?;
        info!(location = %location.id, name = %location.name, "location removed");
        Ok(())
    }

    /// Remove an adventure and everything it owns.
    pub async fn remove_adventure(&self, adventure: AdventureId) -> EngineResult<()> {
        let adventure = self.adventure(adventure).await?;
        let games = self.stores.games.list_for_adventure(adventure.id).await?;
        self.clear_games(format!("adventure {}", adventure.id), games).await?;

        for location in self.stores.locations.list_for_adventure(adventure.id).await? {
            self.purge_location(&location).await?;
        }
        for script in self.stores.scripts.list_for_adventure(adventure.id).await? {
            self.drop_edges(script.id).await?;
            self.stores.scripts.remove(script.id).await?;
        }
        for entry in self.stores.copies.list_for_adventure(adventure.id).await? {
            self.stores.copies.remove(entry.id).await?;
        }
        self.stores.adventures.remove(adventure.id).await?;
        info!(adventure = %adventure.id, name = %adventure.name, "adventure removed");
        Ok(())
    }

    async fn clear_games(&self, target: String, games: Vec<Game>) -> EngineResult<()> {
        if games.is_empty() {
            return Ok(());
        }
        match self.config.removal_policy {
            RemovalPolicy::Reject => Err(EngineError::HasActiveGames {
                target,
                count: games.len(),
            }),
            RemovalPolicy::Cascade => {
                for game in games {
                    self.discard_game(game.id).await?;
                }
                Ok(())
            }
        }
    }

    async fn purge_location(&self, location: &Location) -> EngineResult<()> {
        let mut routes: BTreeSet<RouteId> = BTreeSet::new();
        routes.extend(self.stores.routes.list_from(location.id).await?.iter().map(|r| r.id));
        routes.extend(self.stores.routes.list_to(location.id).await?.iter().map(|r| r.id));
        for route in routes {
            self.stores.routes.remove(route).await?;
        }
        self.stores.locations.remove(location.id).await?;
        Ok(())
    }

    async fn drop_edges(&self, script: ScriptId) -> EngineResult<()> {
        let mut edges: BTreeSet<ScriptIncludeId> = BTreeSet::new();
        edges.extend(self.stores.includes.includes_of(script).await?.iter().map(|e| e.id));
        edges.extend(self.stores.includes.included_in(script).await?.iter().map(|e| e.id));
        for edge in edges {
            self.stores.includes.remove(edge).await?;
        }
        Ok(())
    }
}

fn clear(slot: &mut Option<ScriptId>, script: ScriptId) {
    if *slot == Some(script) {
        *slot = None;
    }
}
