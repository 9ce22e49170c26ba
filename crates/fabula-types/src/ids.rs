//! Type-safe identifier wrappers around declarative id strings.
//!
//! Every entity in the world state carries a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. Unlike machine-generated
//! UUIDs, these ids are authored slugs (`char_varo`, `rel_varo_cassia`,
//! `secret_grain_fraud`) that appear verbatim in the JSON documents and in
//! expression paths, so the wrappers are backed by [`String`].

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an id [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an existing id string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// View the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a character.
    CharacterId
}

define_id! {
    /// Unique identifier for a directed relationship edge.
    RelationshipId
}

define_id! {
    /// Unique identifier for a secret.
    SecretId
}

define_id! {
    /// Unique identifier for a location in the world document.
    LocationId
}

define_id! {
    /// Unique identifier for a public office in the assets document.
    OfficeId
}

define_id! {
    /// Unique identifier for an open narrative thread.
    ThreadId
}

define_id! {
    /// Unique identifier for an operator in the catalog.
    OperatorId
}

define_id! {
    /// Identifier for a cash-ledger holder (a character id or an
    /// institutional holder such as `treasury`).
    HolderId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let character = CharacterId::new("char_varo");
        let holder = HolderId::new("char_varo");
        // Same slug, different types -- the compiler enforces no mixing.
        assert_eq!(character.as_str(), holder.as_str());
    }

    #[test]
    fn id_serializes_as_bare_string() {
        let id = CharacterId::new("char_varo");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"char_varo\""));
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = SecretId::new("secret_grain_fraud");
        let json = serde_json::to_string(&original).ok();
        let restored: Result<SecretId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_inner() {
        let id = ThreadId::new("thread_who_burned_the_granary");
        assert_eq!(id.to_string(), "thread_who_burned_the_granary");
    }
}
