use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::copy::CopyKey;
use crate::id::{ContentId, GameId};

/// What a content entry shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentSource {
    /// Authored copy, resolved in the game's language when read.
    Copy(CopyKey),
    /// Literal text a script emitted.
    Text(String),
}

/// One entry of a game's transcript.
///
/// For a fixed game, positions are unique and strictly increasing in
/// creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Unique identifier.
    pub id: ContentId,
    /// The game this entry belongs to.
    pub game_id: GameId,
    /// Zero-based position in the game's transcript.
    pub position: u64,
    /// Copy key or literal text.
    pub source: ContentSource,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

impl Content {
    /// Create an entry at `position`.
    pub fn new(game_id: GameId, position: u64, source: ContentSource) -> Self {
        Self {
            id: ContentId::new(),
            game_id,
            position,
            source,
            created_at: Utc::now(),
        }
    }
}
