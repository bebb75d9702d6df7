//! Persistence ports for Wayfarer.
//!
//! The engine never talks to storage directly. It is handed a [`Stores`]
//! bundle of port trait objects, one per row type, and treats them as the
//! only source of truth. [`MemoryStore`] implements every port in-process.

/// Error types for port operations.
pub mod error;
/// The in-process store.
pub mod memory;
/// Port traits, one per row type.
pub mod ports;

mod stores;

pub use error::{RepoError, RepoResult};
pub use memory::MemoryStore;
pub use ports::{
    AdventureRepo, ContentRepo, CopyRepo, GameRepo, LanguageRepo, LocationRepo, RouteRepo,
    ScriptIncludeRepo, ScriptRepo,
};
pub use stores::Stores;
