use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }
    };
}

define_id!(
    /// Identifies an adventure.
    AdventureId
);
define_id!(
    /// Identifies a location inside an adventure.
    LocationId
);
define_id!(
    /// Identifies a route between two locations.
    RouteId
);
define_id!(
    /// Identifies a script.
    ScriptId
);
define_id!(
    /// Identifies a single include edge between two scripts.
    ScriptIncludeId
);
define_id!(
    /// Identifies a game session.
    GameId
);
define_id!(
    /// Identifies one entry in a game's content log.
    ContentId
);
define_id!(
    /// Identifies a single copy row (one key in one language).
    CopyId
);
define_id!(
    /// Identifies a language row.
    LanguageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(GameId::new(), GameId::new());
    }

    #[test]
    fn display_is_short() {
        let id = ScriptId(Uuid::nil());
        assert_eq!(id.to_string(), "00000000");
    }
}
