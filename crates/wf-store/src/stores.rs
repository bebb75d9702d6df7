use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::ports::{
    AdventureRepo, ContentRepo, CopyRepo, GameRepo, LanguageRepo, LocationRepo, RouteRepo,
    ScriptIncludeRepo, ScriptRepo,
};

/// The full set of ports an engine is constructed with.
#[derive(Clone)]
pub struct Stores {
    /// Adventure rows.
    pub adventures: Arc<dyn AdventureRepo>,
    /// Location rows.
    pub locations: Arc<dyn LocationRepo>,
    /// Route rows.
    pub routes: Arc<dyn RouteRepo>,
    /// Script rows.
    pub scripts: Arc<dyn ScriptRepo>,
    /// Script include edges.
    pub includes: Arc<dyn ScriptIncludeRepo>,
    /// Game rows.
    pub games: Arc<dyn GameRepo>,
    /// Content log entries.
    pub contents: Arc<dyn ContentRepo>,
    /// Copy rows.
    pub copies: Arc<dyn CopyRepo>,
    /// Language rows.
    pub languages: Arc<dyn LanguageRepo>,
}

impl Stores {
    /// Back every port with the same in-memory store.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            adventures: store.clone(),
            locations: store.clone(),
            routes: store.clone(),
            scripts: store.clone(),
            includes: store.clone(),
            games: store.clone(),
            contents: store.clone(),
            copies: store.clone(),
            languages: store,
        }
    }

    /// A fresh, empty in-memory bundle.
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
