//! The engine handle shared by every operation.
//!
//! Operations are split by concern across `navigation`, `lifecycle`,
//! `projection`, `authoring` and `validate`, each adding methods to
//! [`Engine`].

use std::sync::Arc;

use wf_core::{Adventure, AdventureId, Game, GameId, Location, LocationId, Route, RouteId, ScriptId};
use wf_store::Stores;

use crate::clock::{Clock, LogicalClock};
use crate::config::EngineConfig;
use crate::copy::CopyResolver;
use crate::error::{EngineError, EngineResult, Missing};
use crate::executor::ScriptExecutor;
use crate::includes::IncludeResolver;
use crate::locks::{GameGuard, GameLocks};
use crate::log::{ContentLog, LogLine};
use crate::runtime::{LuaRuntime, ScriptRuntime};

/// The adventure runtime.
///
/// Cheap to share behind an `Arc`. Every mutating operation on a game holds
/// that game's guard until it returns.
pub struct Engine {
    pub(crate) stores: Stores,
    pub(crate) copies: CopyResolver,
    pub(crate) includes: IncludeResolver,
    pub(crate) executor: ScriptExecutor,
    pub(crate) log: ContentLog,
    pub(crate) locks: GameLocks,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: EngineConfig,
}

impl Engine {
    /// Wire an engine from its ports, a script runtime and a clock.
    pub fn new(
        stores: Stores,
        runtime: Arc<dyn ScriptRuntime>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let copies = CopyResolver::new(stores.copies.clone());
        let includes = IncludeResolver::new(stores.scripts.clone(), stores.includes.clone());
        let log = ContentLog::new(stores.contents.clone());
        let executor = ScriptExecutor::new(
            stores.scripts.clone(),
            includes.clone(),
            copies.clone(),
            log.clone(),
            runtime,
        );
        Self {
            stores,
            copies,
            includes,
            executor,
            log,
            locks: GameLocks::new(),
            clock,
            config,
        }
    }

    /// An engine over `stores` running Lua scripts with a logical clock.
    pub fn with_lua(stores: Stores, config: EngineConfig) -> Self {
        let runtime = Arc::new(LuaRuntime::new(config.script_timeout));
        Self::new(stores, runtime, Arc::new(LogicalClock::new()), config)
    }

    /// An engine over a fresh, empty in-memory store.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::with_lua(Stores::in_memory(), config)
    }

    /// The ports this engine reads and writes.
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// The configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The copy resolver.
    pub fn copies(&self) -> &CopyResolver {
        &self.copies
    }

    /// The include resolver.
    pub fn includes(&self) -> &IncludeResolver {
        &self.includes
    }

    /// The content log.
    pub fn content_log(&self) -> &ContentLog {
        &self.log
    }

    /// The per-game locks.
    pub fn locks(&self) -> &GameLocks {
        &self.locks
    }

    /// Load a game.
    pub async fn game(&self, id: GameId) -> EngineResult<Game> {
        self.stores
            .games
            .get(id)
            .await?
            .ok_or(EngineError::NotFound(Missing::Game(id)))
    }

    /// Every game playing an adventure, including ones that need recovery.
    pub async fn games_for(&self, adventure: AdventureId) -> EngineResult<Vec<Game>> {
        Ok(self.stores.games.list_for_adventure(adventure).await?)
    }

    /// Run one script against a game outside of any transition.
    pub async fn execute_script(&self, game: GameId, script: ScriptId) -> EngineResult<Vec<LogLine>> {
        let _guard = self.lock(game).await?;
        let mut game = self.game(game).await?;
        ensure_active(&game)?;
        let result = self.executor.execute(&mut game, script).await;
        self.stores.games.save(&game).await?;
        result
    }

    pub(crate) async fn lock(&self, game: GameId) -> EngineResult<GameGuard> {
        self.locks.acquire(game, self.config.busy_policy).await
    }

    pub(crate) async fn adventure(&self, id: AdventureId) -> EngineResult<Adventure> {
        self.stores
            .adventures
            .get(id)
            .await?
            .ok_or(EngineError::NotFound(Missing::Adventure(id)))
    }

    pub(crate) async fn location(&self, id: LocationId) -> EngineResult<Location> {
        self.stores
            .locations
            .get(id)
            .await?
            .ok_or(EngineError::NotFound(Missing::Location(id)))
    }

    pub(crate) async fn route(&self, id: RouteId) -> EngineResult<Route> {
        self.stores
            .routes
            .get(id)
            .await?
            .ok_or(EngineError::NotFound(Missing::Route(id)))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

/// Mutations are refused until a timed-out game is recovered.
pub(crate) fn ensure_active(game: &Game) -> EngineResult<()> {
    if game.needs_recovery() {
        return Err(EngineError::GameNeedsRecovery(game.id));
    }
    Ok(())
}
