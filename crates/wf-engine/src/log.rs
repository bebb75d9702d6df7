//! The per-game content log.
//!
//! Append-only. Positions come from the game's own counter, so a game's log
//! read in position order is its full transcript.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use wf_core::{Content, ContentSource, Game, GameId};
use wf_store::ContentRepo;

use crate::error::EngineResult;

/// One displayed line of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    /// Position in the game's log.
    pub position: u64,
    /// Display text in the game's language.
    pub text: String,
}

impl LogLine {
    /// A line at `position`.
    pub fn new(position: u64, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// The texts of some lines, in order.
pub fn texts(lines: &[LogLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

/// Appends to and reads from the content port.
#[derive(Clone)]
pub struct ContentLog {
    contents: Arc<dyn ContentRepo>,
}

impl ContentLog {
    /// A log over the content port.
    pub fn new(contents: Arc<dyn ContentRepo>) -> Self {
        Self { contents }
    }

    /// Append one entry at the game's next position.
    ///
    /// The counter only advances once the entry is stored, so a failed
    /// append leaves no gap.
    pub async fn append(
        &self,
        game: &mut Game,
        source: ContentSource,
        text: impl Into<String>,
    ) -> EngineResult<LogLine> {
        let content = Content::new(game.id, game.next_position, source);
        self.contents.add(&content).await?;
        let position = game.take_position();
        debug!(game = %game.id, position, "content appended");
        Ok(LogLine::new(position, text))
    }

    /// Every entry of a game in position order.
    pub async fn entries(&self, game: GameId) -> EngineResult<Vec<Content>> {
        Ok(self.contents.list_for_game(game).await?)
    }

    /// Up to `limit` entries starting at position `from`.
    pub async fn page(&self, game: GameId, from: u64, limit: usize) -> EngineResult<Vec<Content>> {
        Ok(self
            .contents
            .list_for_game(game)
            .await?
            .into_iter()
            .filter(|c| c.position >= from)
            .take(limit)
            .collect())
    }

    /// The entry at one position, if logged.
    pub async fn get(&self, game: GameId, position: u64) -> EngineResult<Option<Content>> {
        Ok(self.contents.get_at(game, position).await?)
    }

    /// Drop a game's log. Returns how many entries were removed.
    pub async fn clear(&self, game: GameId) -> EngineResult<usize> {
        Ok(self.contents.remove_for_game(game).await?)
    }
}
