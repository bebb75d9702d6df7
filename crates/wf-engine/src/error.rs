//! Error types for the adventure runtime.

use std::fmt;

use thiserror::Error;
use wf_core::{
    AdventureId, CoreError, GameId, LanguageCode, LocationId, RouteId, ScriptId, ScriptKind,
};
use wf_store::RepoError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Which row a lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// An adventure.
    Adventure(AdventureId),
    /// A location.
    Location(LocationId),
    /// A route.
    Route(RouteId),
    /// A script.
    Script(ScriptId),
    /// A game.
    Game(GameId),
    /// A content log entry.
    Content {
        /// The game whose log was read.
        game: GameId,
        /// The position that is not logged.
        position: u64,
    },
    /// A registered language.
    Language(LanguageCode),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adventure(id) => write!(f, "adventure {id}"),
            Self::Location(id) => write!(f, "location {id}"),
            Self::Route(id) => write!(f, "route {id}"),
            Self::Script(id) => write!(f, "script {id}"),
            Self::Game(id) => write!(f, "game {id}"),
            Self::Content { game, position } => write!(f, "content {position} of game {game}"),
            Self::Language(code) => write!(f, "language \"{code}\""),
        }
    }
}

/// Errors returned by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(Missing),

    /// A script raised an error. Text it emitted before failing stays logged.
    #[error("script {script} failed: {message}")]
    ScriptExecution {
        /// The script that was executed.
        script: ScriptId,
        /// The interpreter's message.
        message: String,
    },

    /// A script ran past its time budget and was aborted.
    #[error("script {script} exceeded its {budget_ms}ms budget")]
    ScriptTimeout {
        /// The script that was executed.
        script: ScriptId,
        /// The budget that was exceeded.
        budget_ms: u64,
    },

    /// The route does not leave the game's current location.
    #[error("route {route} does not leave location {location}")]
    InvalidTransition {
        /// The route that was requested.
        route: RouteId,
        /// Where the game actually is.
        location: LocationId,
    },

    /// No location of the adventure is flagged initial.
    #[error("adventure {0} has no initial location")]
    NoInitialLocation(AdventureId),

    /// More than one location of the adventure is flagged initial.
    #[error("adventure {adventure} has {count} initial locations")]
    AmbiguousInitialLocation {
        /// The adventure being started.
        adventure: AdventureId,
        /// How many initial locations were found.
        count: usize,
    },

    /// Another operation on the same game is in flight.
    #[error("game {0} is busy")]
    GameBusy(GameId),

    /// A script was aborted mid-run; recover the game before continuing.
    #[error("game {0} needs recovery")]
    GameNeedsRecovery(GameId),

    /// A reference points at a row owned by a different adventure.
    #[error("{what} {id} does not belong to adventure {adventure}")]
    ForeignReference {
        /// Kind of row referenced.
        what: &'static str,
        /// The referenced id.
        id: String,
        /// The adventure the reference was made from.
        adventure: AdventureId,
    },

    /// No runtime is registered for this script kind.
    #[error("no runtime for script kind {0}")]
    UnsupportedScriptKind(ScriptKind),

    /// Removal blocked because live games still depend on the target.
    #[error("{target} still has {count} active game(s)")]
    HasActiveGames {
        /// What was being removed.
        target: String,
        /// Number of games in the way.
        count: usize,
    },

    /// Caller-supplied text could not be parsed.
    #[error("{0}")]
    InvalidInput(#[from] CoreError),

    /// The persistence port failed.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl EngineError {
    /// Whether this error is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
