//! Localized copy text.
//!
//! Copy is looked up by an opaque [`CopyKey`] within one [`LanguageCode`].
//! Every language carries a row under [`CopyKey::EMPTY`]: the placeholder
//! shown whenever a key has no text in that language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::id::{AdventureId, CopyId, LanguageId, ScriptId};

/// Opaque key naming a piece of copy independent of language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CopyKey(pub Uuid);

impl CopyKey {
    /// The reserved zero key. Resolves to the per-language placeholder.
    pub const EMPTY: CopyKey = CopyKey(Uuid::nil());

    /// Generate a fresh key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether this is [`CopyKey::EMPTY`].
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for CopyKey {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for CopyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CopyKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidCopyKey(s.to_string()))
    }
}

/// A language code such as `en` or `pt-br`. Always stored lower-case.
///
/// Defaults to `en`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and normalize a code. Accepts ASCII letters, digits, `-` and `_`.
    pub fn parse(code: &str) -> CoreResult<Self> {
        let code = code.trim().to_ascii_lowercase();
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(code))
        } else {
            Err(CoreError::InvalidLanguageCode(code))
        }
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

impl FromStr for LanguageCode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A language players can pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    /// Unique identifier.
    pub id: LanguageId,
    /// Human-readable name, e.g. "English".
    pub name: String,
    /// Code copy rows are stored under.
    pub code: LanguageCode,
}

impl Language {
    /// Create a language row.
    pub fn new(name: impl Into<String>, code: LanguageCode) -> Self {
        Self {
            id: LanguageId::new(),
            name: name.into(),
            code,
        }
    }
}

/// One key's text in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyEntry {
    /// Unique identifier.
    pub id: CopyId,
    /// Language of `text`.
    pub language: LanguageCode,
    /// Adventure this copy was authored for, if scoped.
    pub adventure_id: Option<AdventureId>,
    /// Script this copy was authored for, if scoped.
    pub script_id: Option<ScriptId>,
    /// Key shared by every translation of this text.
    pub key: CopyKey,
    /// Author-facing label.
    pub name: String,
    /// The text itself.
    pub text: String,
}

impl CopyEntry {
    /// Create an unscoped, unnamed entry.
    pub fn new(key: CopyKey, language: LanguageCode, text: impl Into<String>) -> Self {
        Self {
            id: CopyId::new(),
            language,
            adventure_id: None,
            script_id: None,
            key,
            name: String::new(),
            text: text.into(),
        }
    }

    /// The placeholder row for a language.
    pub fn placeholder(language: LanguageCode, text: impl Into<String>) -> Self {
        let mut entry = Self::new(CopyKey::EMPTY, language, text);
        entry.name = "empty".to_string();
        entry
    }

    /// Set the author-facing label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Scope the entry to an adventure.
    pub fn for_adventure(mut self, adventure: AdventureId) -> Self {
        self.adventure_id = Some(adventure);
        self
    }

    /// Scope the entry to a script. Removed with the script.
    pub fn for_script(mut self, script: ScriptId) -> Self {
        self.script_id = Some(script);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_nil() {
        assert!(CopyKey::EMPTY.is_empty());
        assert!(!CopyKey::new().is_empty());
        assert_eq!(CopyKey::default(), CopyKey::EMPTY);
    }

    #[test]
    fn copy_key_parses_its_display_form() {
        let key = CopyKey::new();
        let parsed: CopyKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn copy_key_rejects_garbage() {
        let err = "north-door".parse::<CopyKey>().unwrap_err();
        assert!(err.to_string().contains("north-door"));
    }

    #[test]
    fn language_code_is_lowercased() {
        let code = LanguageCode::parse(" PT-BR ").unwrap();
        assert_eq!(code.as_str(), "pt-br");
    }

    #[test]
    fn default_language_is_english() {
        assert_eq!(LanguageCode::default().as_str(), "en");
    }

    #[test]
    fn language_code_rejects_empty_and_spaces() {
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("en us").is_err());
    }

    #[test]
    fn language_code_deserializes_through_validation() {
        let code: LanguageCode = serde_json::from_str("\"ES\"").unwrap();
        assert_eq!(code.as_str(), "es");
        assert!(serde_json::from_str::<LanguageCode>("\"\"").is_err());
    }

    #[test]
    fn placeholder_uses_empty_key() {
        let entry = CopyEntry::placeholder(LanguageCode::parse("en").unwrap(), "...");
        assert_eq!(entry.key, CopyKey::EMPTY);
        assert_eq!(entry.name, "empty");
    }
}
