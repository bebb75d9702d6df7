//! Starting, ending and recovering games.

use serde::Serialize;
use tracing::{info, warn};
use wf_core::{Adventure, AdventureId, ContentSource, Game, GameId, GameStatus, LanguageCode, Location};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult, Missing};
use crate::log::LogLine;

/// A freshly started game and its opening transcript.
#[derive(Debug, Clone, Serialize)]
pub struct GameStart {
    /// The game as saved after the opening scripts.
    pub game: Game,
    /// Opening text and script output, in order.
    pub lines: Vec<LogLine>,
}

impl Engine {
    /// Start a game at the adventure's initial location.
    ///
    /// `language` falls back to the configured default. If an opening
    /// script fails the game is kept, with whatever it logged so far, and
    /// the error is returned.
    pub async fn start_game(
        &self,
        adventure: AdventureId,
        language: Option<&str>,
    ) -> EngineResult<GameStart> {
        let adventure = self.adventure(adventure).await?;
        let language = match language {
            Some(code) => LanguageCode::parse(code)?,
            None => self.config.default_language.clone(),
        };
        if self.stores.languages.find_by_code(&language).await?.is_none() {
            return Err(EngineError::NotFound(Missing::Language(language)));
        }
        let initial = self.initial_location(&adventure).await?;

        let mut game = Game::new(adventure.id, initial.id, language, self.clock.now());
        self.stores.games.add(&game).await?;
        let _guard = self.lock(game.id).await?;

        let mut lines = Vec::new();
        let result = self.open(&mut game, &adventure, &initial, &mut lines).await;
        self.stores.games.save(&game).await?;
        result?;

        info!(game = %game.id, adventure = %adventure.name, language = %game.language, "game started");
        Ok(GameStart { game, lines })
    }

    async fn open(
        &self,
        game: &mut Game,
        adventure: &Adventure,
        initial: &Location,
        lines: &mut Vec<LogLine>,
    ) -> EngineResult<()> {
        let key = adventure.initial_text;
        if self.config.announce_initial_text && !key.is_empty() {
            let text = self.copies.resolve(key, &game.language).await?;
            lines.push(self.log.append(game, ContentSource::Copy(key), text).await?);
        }
        if let Some(script) = adventure.init_script_id {
            lines.extend(self.executor.execute(game, script).await?);
        }
        if let Some(script) = initial.enter_script_id {
            lines.extend(self.executor.execute(game, script).await?);
        }
        Ok(())
    }

    /// The adventure's single initial location.
    pub async fn initial_location(&self, adventure: &Adventure) -> EngineResult<Location> {
        let mut initial: Vec<Location> = self
            .stores
            .locations
            .list_for_adventure(adventure.id)
            .await?
            .into_iter()
            .filter(|l| l.initial)
            .collect();
        match initial.len() {
            0 => Err(EngineError::NoInitialLocation(adventure.id)),
            1 => Ok(initial.remove(0)),
            count => Err(EngineError::AmbiguousInitialLocation {
                adventure: adventure.id,
                count,
            }),
        }
    }

    /// Run the termination script, then remove the game and its log.
    ///
    /// Returns what the termination script logged. If it fails, the game
    /// is kept. A game needing recovery ends without its termination script.
    pub async fn end_game(&self, game: GameId) -> EngineResult<Vec<LogLine>> {
        let guard = self.lock(game).await?;
        let mut game = self.game(game).await?;

        let termination = self
            .stores
            .adventures
            .get(game.adventure_id)
            .await?
            .and_then(|a| a.termination_script_id);

        let mut lines = Vec::new();
        match termination {
            Some(_) if game.needs_recovery() => {
                warn!(game = %game.id, "skipping termination script of a game needing recovery");
            }
            Some(script) => {
                let result = self.executor.execute(&mut game, script).await;
                self.stores.games.save(&game).await?;
                lines = result?;
            }
            None => {}
        }

        let removed = self.log.clear(game.id).await?;
        self.stores.games.remove(game.id).await?;
        drop(guard);

        info!(game = %game.id, entries = removed, "game ended");
        Ok(lines)
    }

    /// Clear a game's `NeedsRecovery` mark so it accepts operations again.
    pub async fn recover_game(&self, game: GameId) -> EngineResult<Game> {
        let _guard = self.lock(game).await?;
        let mut game = self.game(game).await?;
        if game.needs_recovery() {
            game.status = GameStatus::Active;
            game.touch();
            self.stores.games.save(&game).await?;
            info!(game = %game.id, "game recovered");
        }
        Ok(game)
    }

    /// Remove a game and its log without running any script.
    pub(crate) async fn discard_game(&self, game: GameId) -> EngineResult<()> {
        let guard = self.lock(game).await?;
        self.log.clear(game).await?;
        self.stores.games.remove(game).await?;
        drop(guard);
        info!(game = %game, "game discarded");
        Ok(())
    }
}
