//! Test adventure: a clearing with a route north into a dark cave.

use std::sync::Arc;

use wf_core::{
    Adventure, AdventureId, CopyEntry, CopyKey, GameId, Language, LanguageCode, Location,
    LocationId, Route, RouteId, Script,
};
use wf_store::{
    AdventureRepo, CopyRepo, LanguageRepo, LocationRepo, MemoryStore, RouteRepo, ScriptRepo,
    Stores,
};

use crate::config::EngineConfig;
use crate::engine::Engine;

pub(crate) struct Scenario {
    pub engine: Engine,
    pub store: Arc<MemoryStore>,
    pub adventure: AdventureId,
    pub start: LocationId,
    pub cave: LocationId,
    pub north: RouteId,
    pub start_description: CopyKey,
    pub north_label: CopyKey,
}

impl Scenario {
    pub async fn new() -> Self {
        Self::with_config(EngineConfig::default()).await
    }

    pub async fn with_config(config: EngineConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let s = store.as_ref();
        let en = LanguageCode::parse("en").unwrap();
        let es = LanguageCode::parse("es").unwrap();

        LanguageRepo::add(s, &Language::new("English", en.clone())).await.unwrap();
        LanguageRepo::add(s, &Language::new("Español", es.clone())).await.unwrap();

        let adventure = Adventure::new("The Cave");
        AdventureRepo::add(s, &adventure).await.unwrap();

        let start_description = CopyKey::new();
        let north_label = CopyKey::new();
        let copy = [
            CopyEntry::placeholder(en.clone(), "(nothing)"),
            CopyEntry::placeholder(es.clone(), "(nada)"),
            CopyEntry::new(start_description, en.clone(), "A quiet clearing."),
            CopyEntry::new(start_description, es.clone(), "Un claro tranquilo."),
            CopyEntry::new(north_label, en.clone(), "Go north"),
        ];
        for entry in &copy {
            CopyRepo::add(s, &entry.clone().for_adventure(adventure.id)).await.unwrap();
        }

        let welcome = Script::new(adventure.id, "welcome", r#"emit("Welcome")"#);
        let walk = Script::new(adventure.id, "walk-north", r#"emit("You walk north")"#);
        let dark = Script::new(adventure.id, "dark", r#"emit("It is dark")"#);
        for script in [&welcome, &walk, &dark] {
            ScriptRepo::add(s, script).await.unwrap();
        }

        let start = Location::new(adventure.id, "Start")
            .initial()
            .with_description(start_description)
            .with_enter_script(welcome.id);
        let cave = Location::new(adventure.id, "Cave").with_enter_script(dark.id);
        LocationRepo::add(s, &start).await.unwrap();
        LocationRepo::add(s, &cave).await.unwrap();

        let north = Route::new(start.id, cave.id, "go-north")
            .with_label(north_label)
            .with_script(walk.id);
        RouteRepo::add(s, &north).await.unwrap();

        let engine = Engine::with_lua(Stores::from_memory(store.clone()), config);
        Self {
            engine,
            store,
            adventure: adventure.id,
            start: start.id,
            cave: cave.id,
            north: north.id,
            start_description,
            north_label,
        }
    }

    /// Start an English game and return its id.
    pub async fn start_game(&self) -> GameId {
        self.engine
            .start_game(self.adventure, Some("en"))
            .await
            .unwrap()
            .game
            .id
    }
}
