use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{AdventureId, ScriptId, ScriptIncludeId};

/// The language a script body is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    /// Lua 5.4 source run in the embedded sandbox.
    #[default]
    Lua,
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lua => write!(f, "lua"),
        }
    }
}

/// Author-supplied code attached to an adventure trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Unique identifier.
    pub id: ScriptId,
    /// Owning adventure.
    pub adventure_id: AdventureId,
    /// Author-facing name; also the chunk name in runtime errors.
    pub name: String,
    /// Runtime the body is written for.
    pub kind: ScriptKind,
    /// Source text.
    pub content: String,
}

impl Script {
    /// Create a Lua script.
    pub fn new(adventure_id: AdventureId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: ScriptId::new(),
            adventure_id,
            name: name.into(),
            kind: ScriptKind::Lua,
            content: content.into(),
        }
    }
}

/// Directed edge: `included_in_id` pulls in `includes_id` before its own body.
///
/// Edges of one script are concatenated in ascending `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInclude {
    /// Unique identifier.
    pub id: ScriptIncludeId,
    /// The including script.
    pub included_in_id: ScriptId,
    /// The script pulled in.
    pub includes_id: ScriptId,
    /// Sort key among the includer's edges.
    pub order: i32,
}

impl ScriptInclude {
    /// Create an edge.
    pub fn new(included_in_id: ScriptId, includes_id: ScriptId, order: i32) -> Self {
        Self {
            id: ScriptIncludeId::new(),
            included_in_id,
            includes_id,
            order,
        }
    }
}
