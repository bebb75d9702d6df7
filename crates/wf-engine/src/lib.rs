//! Adventure runtime for Wayfarer.
//!
//! Runs games against adventures held behind the [`wf_store`] ports:
//! resolving localized copy, flattening script includes, executing Lua
//! scripts in a sandbox, moving games along routes, and keeping each game's
//! append-only content log.
//!
//! ```ignore
//! let engine = Engine::with_lua(stores, EngineConfig::default());
//! let start = engine.start_game(adventure, Some("en")).await?;
//! let step = engine.take_route(start.game.id, route).await?;
//! ```

pub mod authoring;
pub mod clock;
pub mod config;
pub mod copy;
pub mod engine;
pub mod error;
pub mod executor;
pub mod includes;
pub mod lifecycle;
pub mod locks;
pub mod log;
pub mod navigation;
pub mod projection;
pub mod runtime;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use clock::{Clock, LogicalClock};
pub use config::{BusyPolicy, EngineConfig, RemovalPolicy};
pub use copy::{CopyResolver, CopyTable};
pub use engine::Engine;
pub use error::{EngineError, EngineResult, Missing};
pub use executor::ScriptExecutor;
pub use includes::{Flattened, IncludeResolver, IncludeWarning};
pub use lifecycle::GameStart;
pub use locks::{GameGuard, GameLocks};
pub use log::{ContentLog, LogLine};
pub use navigation::Transition;
pub use projection::{Exit, LocationView};
pub use runtime::{
    Emission, LuaRuntime, RunOutcome, ScriptBody, ScriptContext, ScriptFault, ScriptRuntime,
};
pub use validate::ValidationIssue;
