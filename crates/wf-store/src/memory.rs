//! In-process implementation of every port.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use wf_core::{
    Adventure, AdventureId, Content, CopyEntry, CopyId, CopyKey, Game, GameId, Language,
    LanguageCode, LanguageId, Location, LocationId, Route, RouteId, Script, ScriptId,
    ScriptInclude, ScriptIncludeId,
};

use crate::error::{RepoError, RepoResult};
use crate::ports::{
    AdventureRepo, ContentRepo, CopyRepo, GameRepo, LanguageRepo, LocationRepo, RouteRepo,
    ScriptIncludeRepo, ScriptRepo,
};

#[derive(Debug, Default)]
struct Tables {
    adventures: Vec<Adventure>,
    locations: Vec<Location>,
    routes: Vec<Route>,
    scripts: Vec<Script>,
    includes: Vec<ScriptInclude>,
    games: Vec<Game>,
    contents: Vec<Content>,
    copies: Vec<CopyEntry>,
    languages: Vec<Language>,
}

/// Every table held in insertion order behind one lock.
///
/// Lists come back in insertion order, which keeps test and demo output
/// stable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| RepoError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| RepoError::Storage("memory store lock poisoned".to_string()))
    }
}

fn insert<T, K: PartialEq + std::fmt::Display>(
    rows: &mut Vec<T>,
    row: &T,
    key: impl Fn(&T) -> K,
) -> RepoResult<()>
where
    T: Clone,
{
    let id = key(row);
    if rows.iter().any(|r| key(r) == id) {
        return Err(RepoError::Duplicate(id.to_string()));
    }
    rows.push(row.clone());
    Ok(())
}

fn replace<T, K: PartialEq + std::fmt::Display>(
    rows: &mut [T],
    row: &T,
    key: impl Fn(&T) -> K,
) -> RepoResult<()>
where
    T: Clone,
{
    let id = key(row);
    let slot = rows
        .iter_mut()
        .find(|r| key(r) == id)
        .ok_or_else(|| RepoError::Missing(id.to_string()))?;
    *slot = row.clone();
    Ok(())
}

fn delete<T, K: PartialEq + std::fmt::Display>(
    rows: &mut Vec<T>,
    id: K,
    key: impl Fn(&T) -> K,
) -> RepoResult<()> {
    let before = rows.len();
    rows.retain(|r| key(r) != id);
    if rows.len() == before {
        return Err(RepoError::Missing(id.to_string()));
    }
    Ok(())
}

fn find<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Option<T> {
    rows.iter().find(|r| pred(r)).cloned()
}

fn filter<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|r| pred(r)).cloned().collect()
}

#[async_trait]
impl AdventureRepo for MemoryStore {
    async fn get(&self, id: AdventureId) -> RepoResult<Option<Adventure>> {
        Ok(find(&self.read()?.adventures, |a| a.id == id))
    }

    async fn list(&self) -> RepoResult<Vec<Adventure>> {
        Ok(self.read()?.adventures.clone())
    }

    async fn add(&self, adventure: &Adventure) -> RepoResult<()> {
        insert(&mut self.write()?.adventures, adventure, |a| a.id)
    }

    async fn save(&self, adventure: &Adventure) -> RepoResult<()> {
        replace(&mut self.write()?.adventures, adventure, |a| a.id)
    }

    async fn remove(&self, id: AdventureId) -> RepoResult<()> {
        delete(&mut self.write()?.adventures, id, |a| a.id)
    }
}

#[async_trait]
impl LocationRepo for MemoryStore {
    async fn get(&self, id: LocationId) -> RepoResult<Option<Location>> {
        Ok(find(&self.read()?.locations, |l| l.id == id))
    }

    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<Location>> {
        Ok(filter(&self.read()?.locations, |l| {
            l.adventure_id == adventure
        }))
    }

    async fn add(&self, location: &Location) -> RepoResult<()> {
        insert(&mut self.write()?.locations, location, |l| l.id)
    }

    async fn save(&self, location: &Location) -> RepoResult<()> {
        replace(&mut self.write()?.locations, location, |l| l.id)
    }

    async fn remove(&self, id: LocationId) -> RepoResult<()> {
        delete(&mut self.write()?.locations, id, |l| l.id)
    }
}

#[async_trait]
impl RouteRepo for MemoryStore {
    async fn get(&self, id: RouteId) -> RepoResult<Option<Route>> {
        Ok(find(&self.read()?.routes, |r| r.id == id))
    }

    async fn list_from(&self, location: LocationId) -> RepoResult<Vec<Route>> {
        Ok(filter(&self.read()?.routes, |r| r.source_id == location))
    }

    async fn list_to(&self, location: LocationId) -> RepoResult<Vec<Route>> {
        Ok(filter(&self.read()?.routes, |r| {
            r.destination_id == location
        }))
    }

    async fn add(&self, route: &Route) -> RepoResult<()> {
        insert(&mut self.write()?.routes, route, |r| r.id)
    }

    async fn save(&self, route: &Route) -> RepoResult<()> {
        replace(&mut self.write()?.routes, route, |r| r.id)
    }

    async fn remove(&self, id: RouteId) -> RepoResult<()> {
        delete(&mut self.write()?.routes, id, |r| r.id)
    }
}

#[async_trait]
impl ScriptRepo for MemoryStore {
    async fn get(&self, id: ScriptId) -> RepoResult<Option<Script>> {
        Ok(find(&self.read()?.scripts, |s| s.id == id))
    }

    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<Script>> {
        Ok(filter(&self.read()?.scripts, |s| s.adventure_id == adventure))
    }

    async fn add(&self, script: &Script) -> RepoResult<()> {
        insert(&mut self.write()?.scripts, script, |s| s.id)
    }

    async fn save(&self, script: &Script) -> RepoResult<()> {
        replace(&mut self.write()?.scripts, script, |s| s.id)
    }

    async fn remove(&self, id: ScriptId) -> RepoResult<()> {
        delete(&mut self.write()?.scripts, id, |s| s.id)
    }
}

#[async_trait]
impl ScriptIncludeRepo for MemoryStore {
    async fn get(&self, id: ScriptIncludeId) -> RepoResult<Option<ScriptInclude>> {
        Ok(find(&self.read()?.includes, |i| i.id == id))
    }

    async fn includes_of(&self, script: ScriptId) -> RepoResult<Vec<ScriptInclude>> {
        Ok(filter(&self.read()?.includes, |i| {
            i.included_in_id == script
        }))
    }

    async fn included_in(&self, script: ScriptId) -> RepoResult<Vec<ScriptInclude>> {
        Ok(filter(&self.read()?.includes, |i| i.includes_id == script))
    }

    async fn add(&self, include: &ScriptInclude) -> RepoResult<()> {
        insert(&mut self.write()?.includes, include, |i| i.id)
    }

    async fn remove(&self, id: ScriptIncludeId) -> RepoResult<()> {
        delete(&mut self.write()?.includes, id, |i| i.id)
    }
}

#[async_trait]
impl GameRepo for MemoryStore {
    async fn get(&self, id: GameId) -> RepoResult<Option<Game>> {
        Ok(find(&self.read()?.games, |g| g.id == id))
    }

    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<Game>> {
        Ok(filter(&self.read()?.games, |g| g.adventure_id == adventure))
    }

    async fn list_at_location(&self, location: LocationId) -> RepoResult<Vec<Game>> {
        Ok(filter(&self.read()?.games, |g| g.location_id == location))
    }

    async fn add(&self, game: &Game) -> RepoResult<()> {
        insert(&mut self.write()?.games, game, |g| g.id)
    }

    async fn save(&self, game: &Game) -> RepoResult<()> {
        replace(&mut self.write()?.games, game, |g| g.id)
    }

    async fn remove(&self, id: GameId) -> RepoResult<()> {
        delete(&mut self.write()?.games, id, |g| g.id)
    }
}

#[async_trait]
impl ContentRepo for MemoryStore {
    async fn list_for_game(&self, game: GameId) -> RepoResult<Vec<Content>> {
        let mut rows = filter(&self.read()?.contents, |c| c.game_id == game);
        rows.sort_by_key(|c| c.position);
        Ok(rows)
    }

    async fn get_at(&self, game: GameId, position: u64) -> RepoResult<Option<Content>> {
        Ok(find(&self.read()?.contents, |c| {
            c.game_id == game && c.position == position
        }))
    }

    async fn add(&self, content: &Content) -> RepoResult<()> {
        let mut tables = self.write()?;
        if tables
            .contents
            .iter()
            .any(|c| c.game_id == content.game_id && c.position == content.position)
        {
            return Err(RepoError::Duplicate(format!(
                "content {} at position {}",
                content.game_id, content.position
            )));
        }
        insert(&mut tables.contents, content, |c| c.id)
    }

    async fn remove_for_game(&self, game: GameId) -> RepoResult<usize> {
        let mut tables = self.write()?;
        let before = tables.contents.len();
        tables.contents.retain(|c| c.game_id != game);
        Ok(before - tables.contents.len())
    }
}

#[async_trait]
impl CopyRepo for MemoryStore {
    async fn find(&self, key: CopyKey, language: &LanguageCode) -> RepoResult<Option<CopyEntry>> {
        Ok(find(&self.read()?.copies, |c| {
            c.key == key && &c.language == language
        }))
    }

    async fn list_for_language(&self, language: &LanguageCode) -> RepoResult<Vec<CopyEntry>> {
        Ok(filter(&self.read()?.copies, |c| &c.language == language))
    }

    async fn list_visible(
        &self,
        language: &LanguageCode,
        adventure: AdventureId,
    ) -> RepoResult<Vec<CopyEntry>> {
        Ok(filter(&self.read()?.copies, |c| {
            &c.language == language && c.adventure_id.is_none_or(|a| a == adventure)
        }))
    }

    async fn list_for_adventure(&self, adventure: AdventureId) -> RepoResult<Vec<CopyEntry>> {
        Ok(filter(&self.read()?.copies, |c| {
            c.adventure_id == Some(adventure)
        }))
    }

    async fn add(&self, entry: &CopyEntry) -> RepoResult<()> {
        let mut tables = self.write()?;
        if tables
            .copies
            .iter()
            .any(|c| c.key == entry.key && c.language == entry.language)
        {
            return Err(RepoError::Duplicate(format!(
                "copy {} in {}",
                entry.key, entry.language
            )));
        }
        insert(&mut tables.copies, entry, |c| c.id)
    }

    async fn save(&self, entry: &CopyEntry) -> RepoResult<()> {
        replace(&mut self.write()?.copies, entry, |c| c.id)
    }

    async fn remove(&self, id: CopyId) -> RepoResult<()> {
        delete(&mut self.write()?.copies, id, |c| c.id)
    }
}

#[async_trait]
impl LanguageRepo for MemoryStore {
    async fn find_by_code(&self, code: &LanguageCode) -> RepoResult<Option<Language>> {
        Ok(find(&self.read()?.languages, |l| &l.code == code))
    }

    async fn list(&self) -> RepoResult<Vec<Language>> {
        Ok(self.read()?.languages.clone())
    }

    async fn add(&self, language: &Language) -> RepoResult<()> {
        let mut tables = self.write()?;
        if tables.languages.iter().any(|l| l.code == language.code) {
            return Err(RepoError::Duplicate(format!("language {}", language.code)));
        }
        insert(&mut tables.languages, language, |l| l.id)
    }

    async fn remove(&self, id: LanguageId) -> RepoResult<()> {
        delete(&mut self.write()?.languages, id, |l| l.id)
    }
}
