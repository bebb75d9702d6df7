//! Copy resolution.
//!
//! A key always resolves to *some* text: the entry for `(key, language)` if
//! one exists, otherwise that language's placeholder. There is no fallback
//! across languages.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::warn;
use wf_core::{AdventureId, CopyEntry, CopyKey, LanguageCode};
use wf_store::CopyRepo;

use crate::error::EngineResult;

/// All copy of one language, loaded at once.
///
/// Scripts look copy up synchronously, so the executor hands the sandbox a
/// table instead of a port.
#[derive(Debug, Clone, Default)]
pub struct CopyTable {
    language: LanguageCode,
    entries: HashMap<CopyKey, String>,
    placeholder: String,
}

impl CopyTable {
    /// An empty table with the given placeholder.
    pub fn new(language: LanguageCode, placeholder: impl Into<String>) -> Self {
        Self {
            language,
            entries: HashMap::new(),
            placeholder: placeholder.into(),
        }
    }

    /// Add an entry. The empty key replaces the placeholder.
    pub fn insert(&mut self, key: CopyKey, text: impl Into<String>) {
        if key.is_empty() {
            self.placeholder = text.into();
        } else {
            self.entries.insert(key, text.into());
        }
    }

    /// Text for `key`, or the placeholder.
    pub fn text(&self, key: CopyKey) -> &str {
        self.entries
            .get(&key)
            .map(String::as_str)
            .unwrap_or(&self.placeholder)
    }

    /// Whether `key` has its own text.
    pub fn contains(&self, key: CopyKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Text shown for unknown keys.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Language of every entry.
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Number of entries, not counting the placeholder.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries besides the placeholder.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves copy keys through the copy port.
#[derive(Clone)]
pub struct CopyResolver {
    copies: Arc<dyn CopyRepo>,
}

impl CopyResolver {
    /// Resolve through `copies`.
    pub fn new(copies: Arc<dyn CopyRepo>) -> Self {
        Self { copies }
    }

    /// Text for `key` in `language`, degrading to the placeholder.
    pub async fn resolve(&self, key: CopyKey, language: &LanguageCode) -> EngineResult<String> {
        if key.is_empty() {
            return self.placeholder(language).await;
        }
        match self.copies.find(key, language).await? {
            Some(entry) => Ok(entry.text),
            None => self.placeholder(language).await,
        }
    }

    /// The placeholder text of a language. Empty if the language has none.
    pub async fn placeholder(&self, language: &LanguageCode) -> EngineResult<String> {
        match self.copies.find(CopyKey::EMPTY, language).await? {
            Some(entry) => Ok(entry.text),
            None => {
                warn!(language = %language, "no placeholder copy for language");
                Ok(String::new())
            }
        }
    }

    /// Resolve many keys with a single load of the language.
    pub async fn resolve_for_key_set(
        &self,
        keys: impl IntoIterator<Item = CopyKey>,
        language: &LanguageCode,
    ) -> EngineResult<BTreeMap<CopyKey, String>> {
        let keys: Vec<CopyKey> = keys.into_iter().collect();
        let table = self.table(language).await?;
        Ok(keys
            .into_iter()
            .map(|key| (key, table.text(key).to_string()))
            .collect())
    }

    /// Load every entry of a language.
    pub async fn table(&self, language: &LanguageCode) -> EngineResult<CopyTable> {
        let entries = self.copies.list_for_language(language).await?;
        Ok(Self::build(language, entries))
    }

    /// Load the entries of a language an adventure can see: its own copy
    /// and unscoped copy.
    pub async fn table_for(
        &self,
        language: &LanguageCode,
        adventure: AdventureId,
    ) -> EngineResult<CopyTable> {
        let entries = self.copies.list_visible(language, adventure).await?;
        Ok(Self::build(language, entries))
    }

    fn build(language: &LanguageCode, entries: Vec<CopyEntry>) -> CopyTable {
        let mut table = CopyTable::new(language.clone(), String::new());
        let mut has_placeholder = false;
        for entry in entries {
            has_placeholder |= entry.key.is_empty();
            table.insert(entry.key, entry.text);
        }
        if !has_placeholder {
            warn!(language = %language, "no placeholder copy for language");
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_store::MemoryStore;

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    async fn resolver_with(entries: Vec<CopyEntry>) -> CopyResolver {
        let store = Arc::new(MemoryStore::new());
        for entry in &entries {
            CopyRepo::add(store.as_ref(), entry).await.unwrap();
        }
        CopyResolver::new(store)
    }

    #[tokio::test]
    async fn resolves_existing_key() {
        let key = CopyKey::new();
        let resolver = resolver_with(vec![
            CopyEntry::placeholder(lang("en"), "..."),
            CopyEntry::new(key, lang("en"), "A cold wind blows."),
        ])
        .await;
        let text = resolver.resolve(key, &lang("en")).await.unwrap();
        assert_eq!(text, "A cold wind blows.");
    }

    #[tokio::test]
    async fn unknown_key_gives_placeholder() {
        let resolver = resolver_with(vec![CopyEntry::placeholder(lang("en"), "...")]).await;
        let text = resolver.resolve(CopyKey::new(), &lang("en")).await.unwrap();
        assert_eq!(text, "...");
    }

    #[tokio::test]
    async fn no_cross_language_fallback() {
        let key = CopyKey::new();
        let resolver = resolver_with(vec![
            CopyEntry::placeholder(lang("en"), "[en]"),
            CopyEntry::placeholder(lang("es"), "[es]"),
            CopyEntry::new(key, lang("en"), "Hello"),
        ])
        .await;
        let text = resolver.resolve(key, &lang("es")).await.unwrap();
        assert_eq!(text, "[es]");
    }

    #[tokio::test]
    async fn missing_placeholder_degrades_to_empty() {
        let resolver = resolver_with(vec![]).await;
        let text = resolver.resolve(CopyKey::new(), &lang("fr")).await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn key_set_batch() {
        let (a, b, c) = (CopyKey::new(), CopyKey::new(), CopyKey::new());
        let resolver = resolver_with(vec![
            CopyEntry::placeholder(lang("en"), "?"),
            CopyEntry::new(a, lang("en"), "Alpha"),
            CopyEntry::new(b, lang("en"), "Beta"),
        ])
        .await;
        let texts = resolver
            .resolve_for_key_set([a, b, c], &lang("en"))
            .await
            .unwrap();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[&a], "Alpha");
        assert_eq!(texts[&b], "Beta");
        assert_eq!(texts[&c], "?");
    }

    #[test]
    fn table_falls_back_to_placeholder() {
        let key = CopyKey::new();
        let mut table = CopyTable::new(lang("en"), "...");
        table.insert(key, "Lit");
        assert_eq!(table.text(key), "Lit");
        assert_eq!(table.text(CopyKey::new()), "...");
        assert_eq!(table.text(CopyKey::EMPTY), "...");
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn adventure_table_skips_other_adventures() {
        let (mine, theirs) = (AdventureId::new(), AdventureId::new());
        let (own, foreign) = (CopyKey::new(), CopyKey::new());
        let resolver = resolver_with(vec![
            CopyEntry::placeholder(lang("en"), "?"),
            CopyEntry::new(own, lang("en"), "Ours").for_adventure(mine),
            CopyEntry::new(foreign, lang("en"), "Theirs").for_adventure(theirs),
        ])
        .await;

        let table = resolver.table_for(&lang("en"), mine).await.unwrap();
        assert_eq!(table.text(own), "Ours");
        assert!(!table.contains(foreign));
        assert_eq!(table.placeholder(), "?");
    }
}
