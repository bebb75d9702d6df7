//! Per-game serialisation.
//!
//! At most one mutating operation runs against a game at a time. Different
//! games never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use wf_core::GameId;

use crate::config::BusyPolicy;
use crate::error::{EngineError, EngineResult};

type Slots = DashMap<GameId, Arc<Mutex<()>>>;

/// Held for the whole of a mutating operation.
///
/// Dropping the last guard of an idle game releases its slot, so the map
/// only holds games with an operation in flight or queued.
#[derive(Debug)]
pub struct GameGuard {
    game: GameId,
    slots: Arc<Slots>,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for GameGuard {
    fn drop(&mut self) {
        drop(self.held.take());
        // Waiters clone the slot under the shard lock, so a count of one
        // means nobody else holds or awaits it.
        self.slots
            .remove_if(&self.game, |_, slot| Arc::strong_count(slot) == 1);
    }
}

/// One mutex per game with an operation in flight.
#[derive(Debug, Default)]
pub struct GameLocks {
    slots: Arc<Slots>,
}

impl GameLocks {
    /// No game held.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, game: GameId) -> Arc<Mutex<()>> {
        self.slots.entry(game).or_default().clone()
    }

    /// Take the game's guard, failing fast or waiting per `policy`.
    pub async fn acquire(&self, game: GameId, policy: BusyPolicy) -> EngineResult<GameGuard> {
        let slot = self.slot(game);
        let held = match policy {
            BusyPolicy::Reject => slot.try_lock_owned().map_err(|_| {
                debug!(game = %game, "rejecting concurrent operation");
                EngineError::GameBusy(game)
            })?,
            BusyPolicy::Queue => slot.lock_owned().await,
        };
        Ok(GameGuard {
            game,
            slots: self.slots.clone(),
            held: Some(held),
        })
    }

    /// Number of games with a live slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no game has a live slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
