//! Lua 5.4 runtime.
//!
//! Every run gets a fresh interpreter with only `table`, `string`, `math` and
//! `utf8` loaded, and the file/chunk loaders removed from the base library.
//! The host capability is bound as globals:
//!
//! | global                 | effect                                        |
//! |------------------------|-----------------------------------------------|
//! | `emit(text)`           | append literal text to the transcript         |
//! | `emitCopy(key)`        | append authored copy by key                   |
//! | `getState(key)`        | read a game state value (`nil` if unset)      |
//! | `setState(key, value)` | write a game state value (`nil` deletes)      |
//! | `lookupCopy(key)`      | the text of a copy key, without logging it    |
//! | `game`                 | `{ id, adventure, location, language }`       |
//! | `print(...)`           | debug output to the `wf::script` log target   |
//!
//! `pcall` and `xpcall` are wrapped so that once the budget is spent, a
//! protected call re-raises instead of returning to the script.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use mlua::{HookTriggers, Lua, LuaOptions, LuaSerdeExt, StdLib, Value, Variadic, VmState};
use tracing::debug;
use wf_core::{CopyKey, ScriptKind};

use super::{RunOutcome, ScriptBody, ScriptContext, ScriptFault, ScriptRuntime};

const DEFAULT_INSTRUCTION_INTERVAL: u32 = 1_000;

/// Runs [`ScriptKind::Lua`] bodies under a wall-clock budget.
#[derive(Debug, Clone)]
pub struct LuaRuntime {
    timeout: Duration,
    instruction_interval: u32,
}

impl LuaRuntime {
    /// A runtime that aborts scripts after `timeout` of wall-clock time.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            instruction_interval: DEFAULT_INSTRUCTION_INTERVAL,
        }
    }

    /// How many VM instructions run between budget checks.
    pub fn with_instruction_interval(mut self, interval: u32) -> Self {
        self.instruction_interval = interval.max(1);
        self
    }

    /// The wall-clock budget per run.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for LuaRuntime {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl ScriptRuntime for LuaRuntime {
    fn kind(&self) -> ScriptKind {
        ScriptKind::Lua
    }

    fn run(&self, body: &ScriptBody, context: ScriptContext) -> RunOutcome {
        let shared = Rc::new(RefCell::new(context));
        let timed_out = Rc::new(Cell::new(false));

        let result = match sandbox() {
            Ok(lua) => {
                let ran = bind(&lua, &shared).and_then(|()| {
                    self.exec_with_budget(&lua, body, timed_out.clone())
                });
                drop(lua);
                ran
            }
            Err(e) => Err(e),
        };

        // A script that swallows the budget error with pcall still timed out.
        let result = if timed_out.get() {
            Err(ScriptFault::Timeout {
                budget: self.timeout,
            })
        } else {
            result.map_err(|e| ScriptFault::Runtime(e.to_string()))
        };

        let context = Rc::try_unwrap(shared)
            .map(RefCell::into_inner)
            .unwrap_or_else(|rc| rc.borrow().clone());
        RunOutcome { context, result }
    }
}

impl LuaRuntime {
    fn exec_with_budget(
        &self,
        lua: &Lua,
        body: &ScriptBody,
        timed_out: Rc<Cell<bool>>,
    ) -> mlua::Result<()> {
        let started = Instant::now();
        let budget = self.timeout;
        guard_protected_calls(lua, &timed_out)?;
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(self.instruction_interval),
            move |_lua, _debug| {
                if started.elapsed() >= budget {
                    timed_out.set(true);
                    return Err(mlua::Error::RuntimeError(format!(
                        "script exceeded its {}ms budget",
                        budget.as_millis()
                    )));
                }
                Ok(VmState::Continue)
            },
        );
        let out = lua.load(body.source.as_str()).set_name(body.name.as_str()).exec();
        lua.remove_hook();
        out
    }
}

fn sandbox() -> mlua::Result<Lua> {
    let lua = Lua::new_with(
        StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
        LuaOptions::default(),
    )?;
    let globals = lua.globals();
    for name in ["dofile", "loadfile", "load", "collectgarbage"] {
        globals.set(name, Value::Nil)?;
    }
    Ok(lua)
}

const PROTECTED_CALLS: &str = r#"
local spent = ...
local raw_pcall, raw_xpcall = pcall, xpcall
local function check(...)
    if spent() then
        error("script exceeded its budget", 0)
    end
    return ...
end
pcall = function(...) return check(raw_pcall(...)) end
xpcall = function(...) return check(raw_xpcall(...)) end
"#;

fn guard_protected_calls(lua: &Lua, timed_out: &Rc<Cell<bool>>) -> mlua::Result<()> {
    let flag = timed_out.clone();
    let spent = lua.create_function(move |_, ()| Ok(flag.get()))?;
    lua.load(PROTECTED_CALLS)
        .set_name("=protected-calls")
        .call::<()>(spent)
}

fn parse_key(text: &str) -> mlua::Result<CopyKey> {
    text.parse()
        .map_err(|e: wf_core::CoreError| mlua::Error::RuntimeError(e.to_string()))
}

fn bind(lua: &Lua, shared: &Rc<RefCell<ScriptContext>>) -> mlua::Result<()> {
    let globals = lua.globals();

    let ctx = shared.clone();
    globals.set(
        "emit",
        lua.create_function(move |_, text: String| {
            ctx.borrow_mut().emit(text);
            Ok(())
        })?,
    )?;

    let ctx = shared.clone();
    globals.set(
        "emitCopy",
        lua.create_function(move |_, key: String| {
            let key = parse_key(&key)?;
            ctx.borrow_mut().emit_copy(key);
            Ok(())
        })?,
    )?;

    let ctx = shared.clone();
    globals.set(
        "getState",
        lua.create_function(move |lua, key: String| {
            let value = ctx.borrow().get_state(&key).cloned();
            match value {
                Some(value) => lua.to_value(&value),
                None => Ok(Value::Nil),
            }
        })?,
    )?;

    let ctx = shared.clone();
    globals.set(
        "setState",
        lua.create_function(move |lua, (key, value): (String, Value)| {
            let value: serde_json::Value = match value {
                Value::Nil => serde_json::Value::Null,
                other => lua.from_value(other)?,
            };
            ctx.borrow_mut().set_state(key, value);
            Ok(())
        })?,
    )?;

    let ctx = shared.clone();
    globals.set(
        "lookupCopy",
        lua.create_function(move |_, key: String| {
            let key = parse_key(&key)?;
            Ok(ctx.borrow().lookup_copy(key).to_string())
        })?,
    )?;

    let ctx = shared.clone();
    globals.set(
        "print",
        lua.create_function(move |_, values: Variadic<Value>| {
            let parts = values
                .iter()
                .map(Value::to_string)
                .collect::<mlua::Result<Vec<_>>>()?;
            debug!(target: "wf::script", game = %ctx.borrow().game, "{}", parts.join("\t"));
            Ok(())
        })?,
    )?;

    let game = lua.create_table()?;
    {
        let ctx = shared.borrow();
        game.set("id", ctx.game.0.to_string())?;
        game.set("adventure", ctx.adventure.0.to_string())?;
        game.set("location", ctx.location.0.to_string())?;
        game.set("language", ctx.language.as_str())?;
    }
    globals.set("game", game)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::CopyTable;
    use serde_json::json;
    use wf_core::{
        AdventureId, ContentSource, GameId, GameState, LanguageCode, LocationId, Script,
    };

    fn body(source: &str) -> ScriptBody {
        ScriptBody::assemble(&Script::new(AdventureId::new(), "test", source), &[])
    }

    fn context(copies: CopyTable) -> ScriptContext {
        ScriptContext::new(
            GameId::new(),
            AdventureId::new(),
            LocationId::new(),
            GameState::new(),
            copies,
        )
    }

    fn run(source: &str) -> RunOutcome {
        let copies = CopyTable::new(LanguageCode::default(), "");
        LuaRuntime::default().run(&body(source), context(copies))
    }

    fn texts(outcome: &RunOutcome) -> Vec<String> {
        outcome
            .context
            .emitted()
            .iter()
            .map(|e| e.text.clone())
            .collect()
    }

    #[test]
    fn emits_in_order() {
        let out = run(r#"emit("Welcome") emit("to the cave")"#);
        assert!(out.result.is_ok());
        assert_eq!(texts(&out), vec!["Welcome", "to the cave"]);
    }

    #[test]
    fn numbers_are_emitted_as_text() {
        let out = run("emit(1 + 2)");
        assert_eq!(texts(&out), vec!["3"]);
    }

    #[test]
    fn state_reads_and_writes() {
        let out = run(
            r#"
            setState("visits", (getState("visits") or 0) + 1)
            setState("inventory", { "lamp", "rope" })
            setState("gone", "soon")
            setState("gone", nil)
            emit(tostring(getState("missing")))
            "#,
        );
        assert!(out.result.is_ok(), "{:?}", out.result);
        let state = &out.context.state;
        assert_eq!(state.get("visits"), Some(&json!(1)));
        assert_eq!(state.get("inventory"), Some(&json!(["lamp", "rope"])));
        assert!(!state.contains("gone"));
        assert_eq!(texts(&out), vec!["nil"]);
    }

    #[test]
    fn copy_lookup_and_emit() {
        let key = CopyKey::new();
        let mut copies = CopyTable::new(LanguageCode::default(), "");
        copies.insert(CopyKey::EMPTY, "(nothing)");
        copies.insert(key, "A narrow ledge.");
        let source = format!(
            r#"
            local text = lookupCopy("{key}")
            emit(text .. "!")
            emitCopy("{key}")
            emitCopy("{missing}")
            "#,
            missing = CopyKey::new()
        );
        let out = LuaRuntime::default().run(&body(&source), context(copies));
        assert!(out.result.is_ok(), "{:?}", out.result);
        assert_eq!(
            texts(&out),
            vec!["A narrow ledge.!", "A narrow ledge.", "(nothing)"]
        );
        assert_eq!(out.context.emitted()[1].source, ContentSource::Copy(key));
    }

    #[test]
    fn malformed_copy_key_is_an_error() {
        let out = run(r#"emitCopy("not-a-key")"#);
        assert!(matches!(out.result, Err(ScriptFault::Runtime(_))));
    }

    #[test]
    fn game_table_is_bound() {
        let copies = CopyTable::new(LanguageCode::parse("es").unwrap(), "");
        let ctx = context(copies);
        let location = ctx.location.0.to_string();
        let out = LuaRuntime::default().run(
            &body("emit(game.language) emit(game.location)"),
            ctx,
        );
        assert_eq!(texts(&out), vec!["es".to_string(), location]);
    }

    #[test]
    fn error_keeps_earlier_emissions() {
        let out = run(r#"emit("before") error("boom") emit("after")"#);
        match &out.result {
            Err(ScriptFault::Runtime(message)) => assert!(message.contains("boom")),
            other => panic!("expected runtime fault, got {other:?}"),
        }
        assert_eq!(texts(&out), vec!["before"]);
    }

    #[test]
    fn syntax_error_is_a_runtime_fault() {
        let out = run("emit(");
        assert!(matches!(out.result, Err(ScriptFault::Runtime(_))));
        assert!(out.context.emitted().is_empty());
    }

    #[test]
    fn loaders_are_removed() {
        let out = run(r#"emit(type(load)) emit(type(dofile)) emit(type(io)) emit(type(os))"#);
        assert_eq!(texts(&out), vec!["nil", "nil", "nil", "nil"]);
    }

    #[test]
    fn runaway_script_times_out() {
        let runtime = LuaRuntime::new(Duration::from_millis(20)).with_instruction_interval(100);
        let copies = CopyTable::new(LanguageCode::default(), "");
        let out = runtime.run(&body(r#"emit("start") while true do end"#), context(copies));
        assert_eq!(
            out.result,
            Err(ScriptFault::Timeout {
                budget: Duration::from_millis(20)
            })
        );
        assert_eq!(texts(&out), vec!["start"]);
    }

    fn run_on_thread(source: &'static str, budget: Duration) -> RunOutcome {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = LuaRuntime::new(budget).with_instruction_interval(100);
            let copies = CopyTable::new(LanguageCode::default(), "");
            let _ = tx.send(runtime.run(&body(source), context(copies)));
        });
        rx.recv_timeout(Duration::from_secs(5))
            .expect("script still running 5s past its budget")
    }

    #[test]
    fn pcall_cannot_swallow_the_budget() {
        let out = run_on_thread(
            "while true do pcall(function() while true do end end) end",
            Duration::from_millis(20),
        );
        assert_eq!(
            out.result,
            Err(ScriptFault::Timeout {
                budget: Duration::from_millis(20)
            })
        );
    }

    #[test]
    fn xpcall_cannot_swallow_the_budget() {
        let out = run_on_thread(
            r#"
            emit("looping")
            while true do
                xpcall(function() while true do end end, function(e) return e end)
            end
            "#,
            Duration::from_millis(20),
        );
        assert!(matches!(out.result, Err(ScriptFault::Timeout { .. })));
        assert_eq!(texts(&out), vec!["looping"]);
    }

    #[test]
    fn pcall_still_catches_ordinary_errors() {
        let out = run(
            r#"
            local ok, err = pcall(error, "boom", 0)
            emit(tostring(ok)) emit(err)
            local ok2, value = pcall(function() return 7 end)
            emit(tostring(ok2)) emit(value)
            "#,
        );
        assert!(out.result.is_ok(), "{:?}", out.result);
        assert_eq!(texts(&out), vec!["false", "boom", "true", "7"]);
    }

    #[test]
    fn print_does_not_emit() {
        let out = run(r#"print("debug", 1, true)"#);
        assert!(out.result.is_ok(), "{:?}", out.result);
        assert!(out.context.emitted().is_empty());
    }
}
