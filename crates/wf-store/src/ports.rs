//! One port per row type.
//!
//! Every port offers get-by-id, get-by-parent, add, and remove; mutable rows
//! also offer `save`. Lookups return `Ok(None)` for absent rows; only
//! backend failures are errors.

use async_trait::async_trait;
use wf_core::{
    Adventure, AdventureId, Content, CopyEntry, CopyId, CopyKey, Game, GameId, Language,
    LanguageCode, LanguageId, Location, LocationId, Route, RouteId, Script, ScriptId,
    ScriptInclude, ScriptIncludeId,
};

use crate::error::RepoResult;

/// Storage for [`Adventure`] rows.
#[async_trait]
pub trait AdventureRepo: Send + Sync {
    /// Fetch one adventure.
    async fn get(&self, id: AdventureId) -> RepoResult<Option<Adventure>>;
    /// Every stored adventure.
    async fn list(&self) -> RepoResult<Vec<Adventure>>;
    /// Insert a new adventure.
    async fn add(&self, adventure: &Adventure) -> RepoResult<()>;
    /// Overwrite a stored adventure.
    async fn save(&self, adventure: &Adventure) -> RepoResult<()>;
    /// Delete an adventure row. Owned rows are not touched.
    async fn remove(&self, id: AdventureId) -> RepoResult<()>;
}

/// Storage for [`Location`] rows.
#[async_trait]
pub trait LocationRepo: Send + Sync {
    /// Fetch one location.
    async fn get(&self, id: LocationId) -> RepoResult<Option<Location>>;
    /// Locations owned by an adventure.
    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<Location>>;
    /// Insert a new location.
    async fn add(&self, location: &Location) -> RepoResult<()>;
    /// Overwrite a stored location.
    async fn save(&self, location: &Location) -> RepoResult<()>;
    /// Delete a location row.
    async fn remove(&self, id: LocationId) -> RepoResult<()>;
}

/// Storage for [`Route`] rows.
#[async_trait]
pub trait RouteRepo: Send + Sync {
    /// Fetch one route.
    async fn get(&self, id: RouteId) -> RepoResult<Option<Route>>;
    /// Routes leaving a location.
    async fn list_from(&self, location: LocationId) -> RepoResult<Vec<Route>>;
    /// Routes arriving at a location.
    async fn list_to(&self, location: LocationId) -> RepoResult<Vec<Route>>;
    /// Insert a new route.
    async fn add(&self, route: &Route) -> RepoResult<()>;
    /// Overwrite a stored route.
    async fn save(&self, route: &Route) -> RepoResult<()>;
    /// Delete a route row.
    async fn remove(&self, id: RouteId) -> RepoResult<()>;
}

/// Storage for [`Script`] rows.
#[async_trait]
pub trait ScriptRepo: Send + Sync {
    /// Fetch one script.
    async fn get(&self, id: ScriptId) -> RepoResult<Option<Script>>;
    /// Scripts owned by an adventure.
    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<Script>>;
    /// Insert a new script.
    async fn add(&self, script: &Script) -> RepoResult<()>;
    /// Overwrite a stored script.
    async fn save(&self, script: &Script) -> RepoResult<()>;
    /// Delete a script row. Edges and references are not touched.
    async fn remove(&self, id: ScriptId) -> RepoResult<()>;
}

/// Storage for [`ScriptInclude`] edges.
#[async_trait]
pub trait ScriptIncludeRepo: Send + Sync {
    /// Fetch one edge.
    async fn get(&self, id: ScriptIncludeId) -> RepoResult<Option<ScriptInclude>>;
    /// Edges whose `included_in_id` is `script` (what it pulls in).
    async fn includes_of(&self, script: ScriptId) -> RepoResult<Vec<ScriptInclude>>;
    /// Edges whose `includes_id` is `script` (who pulls it in).
    async fn included_in(&self, script: ScriptId) -> RepoResult<Vec<ScriptInclude>>;
    /// Insert a new edge.
    async fn add(&self, include: &ScriptInclude) -> RepoResult<()>;
    /// Delete an edge.
    async fn remove(&self, id: ScriptIncludeId) -> RepoResult<()>;
}

/// Storage for [`Game`] rows.
#[async_trait]
pub trait GameRepo: Send + Sync {
    /// Fetch one game.
    async fn get(&self, id: GameId) -> RepoResult<Option<Game>>;
    /// Games playing an adventure.
    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<Game>>;
    /// Games currently standing at a location.
    async fn list_at_location(&self, location: LocationId) -> RepoResult<Vec<Game>>;
    /// Insert a new game.
    async fn add(&self, game: &Game) -> RepoResult<()>;
    /// Overwrite a stored game.
    async fn save(&self, game: &Game) -> RepoResult<()>;
    /// Delete a game row. Its content is not touched.
    async fn remove(&self, id: GameId) -> RepoResult<()>;
}

/// Storage for [`Content`] log entries.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// A game's content ordered by ascending position.
    async fn list_for_game(&self, game: GameId) -> RepoResult<Vec<Content>>;
    /// The entry at one position.
    async fn get_at(&self, game: GameId, position: u64) -> RepoResult<Option<Content>>;
    /// Append an entry. A taken `(game, position)` pair is a duplicate.
    async fn add(&self, content: &Content) -> RepoResult<()>;
    /// Remove every entry owned by a game. Returns how many were removed.
    async fn remove_for_game(&self, game: GameId) -> RepoResult<usize>;
}

/// Storage for [`CopyEntry`] rows.
#[async_trait]
pub trait CopyRepo: Send + Sync {
    /// The entry for `key` in `language`, if any.
    async fn find(&self, key: CopyKey, language: &LanguageCode) -> RepoResult<Option<CopyEntry>>;
    /// Every entry in a language.
    async fn list_for_language(&self, language: &LanguageCode) -> RepoResult<Vec<CopyEntry>>;
    /// Entries in `language` scoped to `adventure`, plus unscoped ones.
    async fn list_visible(
        &self,
        language: &LanguageCode,
        adventure: AdventureId,
    ) -> RepoResult<Vec<CopyEntry>>;
    /// Entries scoped to an adventure, in every language.
    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<CopyEntry>>;
    /// Insert a new entry. A taken `(key, language)` pair is a duplicate.
    async fn add(&self, entry: &CopyEntry) -> RepoResult<()>;
    /// Overwrite a stored entry.
    async fn save(&self, entry: &CopyEntry) -> RepoResult<()>;
    /// Delete an entry.
    async fn remove(&self, id: CopyId) -> RepoResult<()>;
}

/// Storage for [`Language`] rows.
#[async_trait]
pub trait LanguageRepo: Send + Sync {
    /// The language with a code, if registered.
    async fn find_by_code(&self, code: &LanguageCode) -> RepoResult<Option<Language>>;
    /// Every registered language.
    async fn list(&self) -> RepoResult<Vec<Language>>;
    /// Register a language.
    async fn add(&self, language: &Language) -> RepoResult<()>;
    /// Unregister a language. Its copy is not touched.
    async fn remove(&self, id: LanguageId) -> RepoResult<()>;
}
