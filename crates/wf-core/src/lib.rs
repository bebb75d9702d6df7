//! Core types for Wayfarer: the data model of a text adventure and of the
//! games played against it.
//!
//! This crate has no I/O. Rows are plain serde structs; references between
//! them are typed identifiers resolved through the persistence ports in
//! `wf-store`, never object graphs.

/// Adventures: the root of everything an author writes.
pub mod adventure;
/// Player-visible output records.
pub mod content;
/// Localized copy text, copy keys, and languages.
pub mod copy;
/// Error types used throughout the crate.
pub mod error;
/// Live game sessions and their state store.
pub mod game;
/// Typed identifiers.
pub mod id;
/// Locations and the routes between them.
pub mod location;
/// Scripts and include edges.
pub mod script;

pub use adventure::Adventure;
pub use content::{Content, ContentSource};
pub use copy::{CopyEntry, CopyKey, Language, LanguageCode};
pub use error::{CoreError, CoreResult};
pub use game::{Game, GameState, GameStatus};
pub use id::{
    AdventureId, ContentId, CopyId, GameId, LanguageId, LocationId, RouteId, ScriptId,
    ScriptIncludeId,
};
pub use location::{Location, Route};
pub use script::{Script, ScriptInclude, ScriptKind};
