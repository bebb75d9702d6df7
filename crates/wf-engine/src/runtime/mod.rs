//! Script runtimes.
//!
//! A runtime receives an assembled body and a [`ScriptContext`], the only
//! capability a script has into the host. It runs the body to completion
//! and hands the context back along with the outcome, whether or not the
//! script failed.

mod lua;

pub use lua::LuaRuntime;

use std::time::Duration;

use wf_core::{
    AdventureId, ContentSource, CopyKey, GameId, GameState, LanguageCode, LocationId, Script,
    ScriptId, ScriptKind,
};

use crate::copy::CopyTable;

/// A script's executable text, with its includes already prepended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBody {
    /// The script being run.
    pub script: ScriptId,
    /// Chunk name for runtime errors.
    pub name: String,
    /// Runtime the body is written for.
    pub kind: ScriptKind,
    /// Includes, then the script's own content, joined by newlines.
    pub source: String,
}

impl ScriptBody {
    /// Concatenate the includes' contents, in order, ahead of the script's own.
    pub fn assemble(script: &Script, includes: &[Script]) -> Self {
        let source = includes
            .iter()
            .chain(std::iter::once(script))
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            script: script.id,
            name: script.name.clone(),
            kind: script.kind,
            source,
        }
    }
}

/// One piece of text a script emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// What the log stores.
    pub source: ContentSource,
    /// Text as displayed right now. Copy emissions are resolved already.
    pub text: String,
}

/// What a running script can see and touch.
#[derive(Debug, Clone)]
pub struct ScriptContext {
    /// The game being played.
    pub game: GameId,
    /// Its adventure.
    pub adventure: AdventureId,
    /// Where the game stands while the script runs.
    pub location: LocationId,
    /// Language copy resolves in.
    pub language: LanguageCode,
    /// The game's state. Written back after the run.
    pub state: GameState,
    copies: CopyTable,
    emitted: Vec<Emission>,
}

impl ScriptContext {
    /// A context with no emissions. The language comes from `copies`.
    pub fn new(
        game: GameId,
        adventure: AdventureId,
        location: LocationId,
        state: GameState,
        copies: CopyTable,
    ) -> Self {
        Self {
            game,
            adventure,
            location,
            language: copies.language().clone(),
            state,
            copies,
            emitted: Vec::new(),
        }
    }

    /// Emit literal text.
    pub fn emit(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.emitted.push(Emission {
            source: ContentSource::Text(text.clone()),
            text,
        });
    }

    /// Emit authored copy by key. The log keeps the key, not the text.
    pub fn emit_copy(&mut self, key: CopyKey) {
        let text = self.copies.text(key).to_string();
        self.emitted.push(Emission {
            source: ContentSource::Copy(key),
            text,
        });
    }

    /// Read a state value.
    pub fn get_state(&self, key: &str) -> Option<&serde_json::Value> {
        self.state.get(key)
    }

    /// Write a state value. `null` deletes the key.
    pub fn set_state(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.set(key, value);
    }

    /// Text of a copy key, without emitting it.
    pub fn lookup_copy(&self, key: CopyKey) -> &str {
        self.copies.text(key)
    }

    /// Emissions so far, oldest first.
    pub fn emitted(&self) -> &[Emission] {
        &self.emitted
    }

    /// Drain the emissions.
    pub fn take_emissions(&mut self) -> Vec<Emission> {
        std::mem::take(&mut self.emitted)
    }
}

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptFault {
    /// The script raised an error, or failed to compile.
    Runtime(String),
    /// The run was aborted after exceeding its budget.
    Timeout {
        /// The budget that was exceeded.
        budget: Duration,
    },
}

/// The context after a run, plus how the run ended.
#[derive(Debug)]
pub struct RunOutcome {
    /// The context, with whatever the script did before stopping.
    pub context: ScriptContext,
    /// How the run ended.
    pub result: Result<(), ScriptFault>,
}

/// An interpreter for one kind of script.
///
/// `run` is synchronous and must not hold interpreter state past its return.
/// The executor calls it from the blocking pool.
pub trait ScriptRuntime: Send + Sync {
    /// The script kind this runtime accepts.
    fn kind(&self) -> ScriptKind;

    /// Run `body` to completion or failure.
    fn run(&self, body: &ScriptBody, context: ScriptContext) -> RunOutcome;
}
