//! Moving a game between locations.
//!
//! A transition runs, in order: the route's script, the current location's
//! exit script, the move itself, and the destination's enter script. The
//! first failure stops the transition. Lines already logged stay logged and
//! the game is saved as it stands.

use serde::Serialize;
use tracing::info;
use wf_core::{Game, GameId, Location, Route, RouteId};

use crate::engine::{Engine, ensure_active};
use crate::error::{EngineError, EngineResult};
use crate::log::LogLine;

/// Result of taking a route.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    /// The game as saved after the transition.
    pub game: Game,
    /// Lines logged during the transition, in order.
    pub lines: Vec<LogLine>,
    /// Whether the destination is a final location.
    pub reached_final: bool,
}

impl Engine {
    /// Take `route` from the game's current location.
    pub async fn take_route(&self, game: GameId, route: RouteId) -> EngineResult<Transition> {
        let _guard = self.lock(game).await?;
        let mut game = self.game(game).await?;
        ensure_active(&game)?;

        let route = self.route(route).await?;
        if route.source_id != game.location_id {
            return Err(EngineError::InvalidTransition {
                route: route.id,
                location: game.location_id,
            });
        }
        let from = self.location(game.location_id).await?;
        let to = self.location(route.destination_id).await?;
        if to.adventure_id != game.adventure_id {
            return Err(EngineError::ForeignReference {
                what: "location",
                id: to.id.to_string(),
                adventure: game.adventure_id,
            });
        }

        let mut lines = Vec::new();
        let result = self.transition(&mut game, &route, &from, &to, &mut lines).await;
        self.stores.games.save(&game).await?;
        result?;

        info!(game = %game.id, from = %from.name, to = %to.name, route = %route.name, "route taken");
        Ok(Transition {
            game,
            lines,
            reached_final: to.is_final,
        })
    }

    async fn transition(
        &self,
        game: &mut Game,
        route: &Route,
        from: &Location,
        to: &Location,
        lines: &mut Vec<LogLine>,
    ) -> EngineResult<()> {
        if let Some(script) = route.route_taken_script_id {
            lines.extend(self.executor.execute(game, script).await?);
        }
        if let Some(script) = from.exit_script_id {
            lines.extend(self.executor.execute(game, script).await?);
        }
        game.move_to(to.id, self.clock.now());
        if let Some(script) = to.enter_script_id {
            lines.extend(self.executor.execute(game, script).await?);
        }
        Ok(())
    }

    /// Routes leaving the game's current location.
    pub async fn routes_from(&self, game: GameId) -> EngineResult<Vec<Route>> {
        let game = self.game(game).await?;
        Ok(self.stores.routes.list_from(game.location_id).await?)
    }

    /// The route leaving the game's location with this name, if any.
    pub async fn find_route(&self, game: GameId, name: &str) -> EngineResult<Option<Route>> {
        Ok(self
            .routes_from(game)
            .await?
            .into_iter()
            .find(|r| r.name == name))
    }
}
