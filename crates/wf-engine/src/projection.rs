//! Turning logged content back into display text.
//!
//! Copy entries are resolved on every read in the game's language, so a
//! transcript always reflects the current copy.

use serde::Serialize;
use wf_core::{ContentSource, CopyKey, GameId, LocationId, RouteId};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult, Missing};
use crate::log::LogLine;

/// A location as the player sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationView {
    /// The location.
    pub id: LocationId,
    /// Author-facing name.
    pub name: String,
    /// Description resolved in the game's language.
    pub description: String,
    /// Whether arriving here ended the story.
    pub is_final: bool,
    /// Routes leaving the location, in stored order.
    pub exits: Vec<Exit>,
}

/// One route out of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exit {
    /// The route to pass to `take_route`.
    pub route: RouteId,
    /// Author-facing route name.
    pub name: String,
    /// Label resolved in the game's language.
    pub label: String,
}

impl Engine {
    /// Text of the entry at `position` in the game's log.
    pub async fn text_for_position(&self, game: GameId, position: u64) -> EngineResult<String> {
        let game = self.game(game).await?;
        let content = self
            .log
            .get(game.id, position)
            .await?
            .ok_or(EngineError::NotFound(Missing::Content {
                game: game.id,
                position,
            }))?;
        match content.source {
            ContentSource::Text(text) => Ok(text),
            ContentSource::Copy(key) => self.copies.resolve(key, &game.language).await,
        }
    }

    /// Every logged line of a game, in position order.
    pub async fn transcript(&self, game: GameId) -> EngineResult<Vec<LogLine>> {
        let game = self.game(game).await?;
        let entries = self.log.entries(game.id).await?;
        let copies = self
            .copies
            .table_for(&game.language, game.adventure_id)
            .await?;
        Ok(entries
            .into_iter()
            .map(|c| {
                let text = match c.source {
                    ContentSource::Text(text) => text,
                    ContentSource::Copy(key) => copies.text(key).to_string(),
                };
                LogLine::new(c.position, text)
            })
            .collect())
    }

    /// The game's current location with its description and exits resolved.
    pub async fn describe_location(&self, game: GameId) -> EngineResult<LocationView> {
        let game = self.game(game).await?;
        let location = self.location(game.location_id).await?;
        let routes = self.stores.routes.list_from(location.id).await?;

        let keys = std::iter::once(location.description).chain(routes.iter().map(|r| r.label));
        let texts = self.copies.resolve_for_key_set(keys, &game.language).await?;
        let text = |key: CopyKey| texts.get(&key).cloned().unwrap_or_default();

        Ok(LocationView {
            id: location.id,
            description: text(location.description),
            exits: routes
                .iter()
                .map(|r| Exit {
                    route: r.id,
                    name: r.name.clone(),
                    label: text(r.label),
                })
                .collect(),
            name: location.name,
            is_final: location.is_final,
        })
    }
}
