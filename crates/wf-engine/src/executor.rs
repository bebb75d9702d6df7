//! Script execution against a live game.

use std::sync::Arc;

use tracing::{debug, warn};
use wf_core::{Game, GameStatus, ScriptId};
use wf_store::ScriptRepo;

use crate::copy::CopyResolver;
use crate::error::{EngineError, EngineResult, Missing};
use crate::includes::IncludeResolver;
use crate::log::{ContentLog, LogLine};
use crate::runtime::{ScriptBody, ScriptContext, ScriptFault, ScriptRuntime};

/// Runs a script, with its includes, against a game.
///
/// Execution is not transactional. Whatever the script emitted and wrote
/// to state before failing is kept.
#[derive(Clone)]
pub struct ScriptExecutor {
    scripts: Arc<dyn ScriptRepo>,
    includes: IncludeResolver,
    copies: CopyResolver,
    log: ContentLog,
    runtime: Arc<dyn ScriptRuntime>,
}

impl ScriptExecutor {
    /// Wire an executor to its collaborators.
    pub fn new(
        scripts: Arc<dyn ScriptRepo>,
        includes: IncludeResolver,
        copies: CopyResolver,
        log: ContentLog,
        runtime: Arc<dyn ScriptRuntime>,
    ) -> Self {
        Self {
            scripts,
            includes,
            copies,
            log,
            runtime,
        }
    }

    /// Assemble the body `script` would run with.
    pub async fn body(&self, game: &Game, script: ScriptId) -> EngineResult<ScriptBody> {
        let script = self
            .scripts
            .get(script)
            .await?
            .ok_or(EngineError::NotFound(Missing::Script(script)))?;
        if script.adventure_id != game.adventure_id {
            return Err(EngineError::ForeignReference {
                what: "script",
                id: script.id.to_string(),
                adventure: game.adventure_id,
            });
        }
        if script.kind != self.runtime.kind() {
            return Err(EngineError::UnsupportedScriptKind(script.kind));
        }

        let flat = self.includes.flatten(script.id).await?;
        let includes: Vec<_> = flat
            .scripts
            .into_iter()
            .filter(|s| {
                let own = s.adventure_id == game.adventure_id;
                if !own {
                    warn!(script = %script.id, include = %s.id, "skipping include from another adventure");
                }
                own
            })
            .collect();

        Ok(ScriptBody::assemble(&script, &includes))
    }

    /// Run `script` and log what it emits. Returns the appended lines.
    ///
    /// The run itself happens on the blocking pool. A timeout marks the
    /// game as needing recovery. The caller persists the game either way.
    pub async fn execute(&self, game: &mut Game, script: ScriptId) -> EngineResult<Vec<LogLine>> {
        let body = self.body(game, script).await?;
        let copies = self
            .copies
            .table_for(&game.language, game.adventure_id)
            .await?;
        let context = ScriptContext::new(
            game.id,
            game.adventure_id,
            game.location_id,
            game.state.clone(),
            copies,
        );

        debug!(game = %game.id, script = %script, name = %body.name, "running script");
        let runtime = self.runtime.clone();
        let mut outcome = tokio::task::spawn_blocking(move || runtime.run(&body, context))
            .await
            .map_err(|e| EngineError::ScriptExecution {
                script,
                message: e.to_string(),
            })?;
        debug!(
            game = %game.id,
            script = %script,
            emitted = outcome.context.emitted().len(),
            ok = outcome.result.is_ok(),
            "script finished"
        );
        game.state = std::mem::take(&mut outcome.context.state);
        game.touch();

        let mut lines = Vec::new();
        for emission in outcome.context.take_emissions() {
            lines.push(self.log.append(game, emission.source, emission.text).await?);
        }

        match outcome.result {
            Ok(()) => Ok(lines),
            Err(ScriptFault::Runtime(message)) => {
                Err(EngineError::ScriptExecution { script, message })
            }
            Err(ScriptFault::Timeout { budget }) => {
                warn!(game = %game.id, script = %script, "script timed out, game needs recovery");
                game.status = GameStatus::NeedsRecovery;
                Err(EngineError::ScriptTimeout {
                    script,
                    budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::texts;
    use crate::runtime::LuaRuntime;
    use serde_json::json;
    use std::time::Duration;
    use wf_core::{AdventureId, ContentSource, CopyEntry, CopyKey, LanguageCode, LocationId, Script, ScriptInclude};
    use wf_store::{ContentRepo, CopyRepo, MemoryStore, ScriptIncludeRepo};

    struct Rig {
        store: Arc<MemoryStore>,
        executor: ScriptExecutor,
        adventure: AdventureId,
    }

    fn rig_with(runtime: LuaRuntime) -> Rig {
        let store = Arc::new(MemoryStore::new());
        let executor = ScriptExecutor::new(
            store.clone(),
            IncludeResolver::new(store.clone(), store.clone()),
            CopyResolver::new(store.clone()),
            ContentLog::new(store.clone()),
            Arc::new(runtime),
        );
        Rig {
            store,
            executor,
            adventure: AdventureId::new(),
        }
    }

    fn rig() -> Rig {
        rig_with(LuaRuntime::default())
    }

    impl Rig {
        async fn script(&self, name: &str, content: &str) -> Script {
            let script = Script::new(self.adventure, name, content);
            ScriptRepo::add(self.store.as_ref(), &script).await.unwrap();
            script
        }

        async fn include(&self, from: &Script, to: &Script, order: i32) {
            let edge = ScriptInclude::new(from.id, to.id, order);
            ScriptIncludeRepo::add(self.store.as_ref(), &edge).await.unwrap();
        }

        fn game(&self) -> Game {
            Game::new(self.adventure, LocationId::new(), LanguageCode::default(), 1)
        }
    }

    #[tokio::test]
    async fn emissions_are_logged_in_order() {
        let rig = rig();
        let script = rig.script("hello", r#"emit("one") emit("two")"#).await;
        let mut game = rig.game();

        let lines = rig.executor.execute(&mut game, script.id).await.unwrap();
        assert_eq!(texts(&lines), vec!["one", "two"]);
        assert_eq!(lines[0].position, 0);
        assert_eq!(lines[1].position, 1);
        assert_eq!(game.next_position, 2);

        let stored = ContentRepo::list_for_game(rig.store.as_ref(), game.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].source, ContentSource::Text("two".into()));
    }

    #[tokio::test]
    async fn includes_run_before_the_script() {
        let rig = rig();
        let helpers = rig.script("helpers", "function shout(s) return string.upper(s) end").await;
        let greeting = rig.script("greeting", r#"local hello = "hello""#).await;
        let main = rig.script("main", "emit(shout(hello))").await;
        rig.include(&main, &greeting, 2).await;
        rig.include(&main, &helpers, 1).await;

        let mut game = rig.game();
        let body = rig.executor.body(&game, main.id).await.unwrap();
        assert!(body.source.starts_with("function shout"));

        // `local` at chunk level stays visible to the rest of the body.
        let lines = rig.executor.execute(&mut game, main.id).await.unwrap();
        assert_eq!(texts(&lines), vec!["HELLO"]);
    }

    #[tokio::test]
    async fn state_persists_on_the_game() {
        let rig = rig();
        let script = rig
            .script("count", r#"setState("count", (getState("count") or 0) + 1)"#)
            .await;
        let mut game = rig.game();
        rig.executor.execute(&mut game, script.id).await.unwrap();
        rig.executor.execute(&mut game, script.id).await.unwrap();
        assert_eq!(game.state.get("count"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn failure_keeps_emitted_text_and_state() {
        let rig = rig();
        let script = rig
            .script("broken", r#"emit("before") setState("seen", true) error("boom")"#)
            .await;
        let mut game = rig.game();

        let err = rig.executor.execute(&mut game, script.id).await.unwrap_err();
        match err {
            EngineError::ScriptExecution { script: id, message } => {
                assert_eq!(id, script.id);
                assert!(message.contains("boom"));
            }
            other => panic!("expected ScriptExecution, got {other:?}"),
        }
        assert_eq!(game.next_position, 1);
        assert_eq!(game.state.get("seen"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn copy_emission_logs_the_key() {
        let rig = rig();
        let key = CopyKey::new();
        CopyRepo::add(rig.store.as_ref(), &CopyEntry::new(key, LanguageCode::default(), "A door."))
            .await
            .unwrap();
        let script = rig.script("door", &format!(r#"emitCopy("{key}")"#)).await;
        let mut game = rig.game();

        let lines = rig.executor.execute(&mut game, script.id).await.unwrap();
        assert_eq!(texts(&lines), vec!["A door."]);
        let stored = ContentRepo::get_at(rig.store.as_ref(), game.id, 0).await.unwrap().unwrap();
        assert_eq!(stored.source, ContentSource::Copy(key));
    }

    #[tokio::test]
    async fn missing_script_is_not_found() {
        let rig = rig();
        let mut game = rig.game();
        let err = rig.executor.execute(&mut game, ScriptId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn script_of_another_adventure_is_rejected() {
        let rig = rig();
        let foreign = Script::new(AdventureId::new(), "foreign", r#"emit("x")"#);
        ScriptRepo::add(rig.store.as_ref(), &foreign).await.unwrap();
        let mut game = rig.game();
        let err = rig.executor.execute(&mut game, foreign.id).await.unwrap_err();
        assert!(matches!(err, EngineError::ForeignReference { what: "script", .. }));
        assert_eq!(game.next_position, 0);
    }

    #[tokio::test]
    async fn timeout_marks_game_for_recovery() {
        let rig = rig_with(LuaRuntime::new(Duration::from_millis(20)).with_instruction_interval(100));
        let script = rig.script("spin", r#"emit("spinning") while true do end"#).await;
        let mut game = rig.game();

        let err = rig.executor.execute(&mut game, script.id).await.unwrap_err();
        assert!(matches!(err, EngineError::ScriptTimeout { budget_ms: 20, .. }));
        assert!(game.needs_recovery());
        assert_eq!(game.next_position, 1);
    }
}
