//! Live game sessions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::copy::LanguageCode;
use crate::id::{AdventureId, GameId, LocationId};

/// Whether a game accepts mutating operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Normal play.
    #[default]
    Active,
    /// A script was aborted mid-run; the game must be recovered before it
    /// continues.
    NeedsRecovery,
}

/// Free-form key/value store scripts read and write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameState {
    values: BTreeMap<String, serde_json::Value>,
}

impl GameState {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value under `key`, if set.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a value. Storing JSON `null` removes the key.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        if value.is_null() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    /// Remove a key, returning its old value.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Whether `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys and values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.values.iter()
    }
}

/// One player's session against an adventure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier.
    pub id: GameId,
    /// The adventure being played.
    pub adventure_id: AdventureId,
    /// Current location.
    pub location_id: LocationId,
    /// Language copy is resolved in. Fixed for the game's lifetime.
    pub language: LanguageCode,
    /// Logical clock value of the last location change.
    pub location_update_timestamp: u64,
    /// Position the next content entry will take.
    pub next_position: u64,
    /// Whether the game accepts mutating operations.
    pub status: GameStatus,
    /// Values written by scripts.
    pub state: GameState,
    /// When the game started.
    pub created_at: DateTime<Utc>,
    /// Last time anything on the game changed.
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Start a game at `location_id` with an empty transcript.
    pub fn new(
        adventure_id: AdventureId,
        location_id: LocationId,
        language: LanguageCode,
        timestamp: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GameId::new(),
            adventure_id,
            location_id,
            language,
            location_update_timestamp: timestamp,
            next_position: 0,
            status: GameStatus::Active,
            state: GameState::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to another location, stamping the move with `timestamp`.
    pub fn move_to(&mut self, location: LocationId, timestamp: u64) {
        self.location_id = location;
        self.location_update_timestamp = timestamp;
        self.touch();
    }

    /// Reserve the next content position.
    pub fn take_position(&mut self) -> u64 {
        let position = self.next_position;
        self.next_position += 1;
        position
    }

    /// Whether a script was aborted and the game awaits recovery.
    pub fn needs_recovery(&self) -> bool {
        self.status == GameStatus::NeedsRecovery
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game() -> Game {
        Game::new(
            AdventureId::new(),
            LocationId::new(),
            LanguageCode::parse("en").unwrap(),
            1,
        )
    }

    #[test]
    fn positions_are_sequential_from_zero() {
        let mut g = game();
        assert_eq!(g.take_position(), 0);
        assert_eq!(g.take_position(), 1);
        assert_eq!(g.next_position, 2);
    }

    #[test]
    fn move_updates_timestamp() {
        let mut g = game();
        let target = LocationId::new();
        g.move_to(target, 7);
        assert_eq!(g.location_id, target);
        assert_eq!(g.location_update_timestamp, 7);
    }

    #[test]
    fn null_removes_state_key() {
        let mut state = GameState::new();
        state.set("lamp", json!(true));
        assert!(state.contains("lamp"));
        state.set("lamp", serde_json::Value::Null);
        assert!(!state.contains("lamp"));
    }

    #[test]
    fn state_serializes_as_plain_map() {
        let mut state = GameState::new();
        state.set("coins", json!(3));
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"coins":3}"#);
    }
}
