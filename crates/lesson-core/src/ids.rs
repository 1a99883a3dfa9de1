//! Branded ID newtypes for type safety.
//!
//! Each identifier in the lesson model is a distinct newtype around `String`,
//! so a topic ID can never be passed where a node ID is expected.
//!
//! - [`TopicId`] and [`NodeId`] are authored: they come from the content
//!   source and are never generated.
//! - [`SessionId`] identifies one viewing session and is generated as a
//!   UUID v7 (time-ordered) via [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

branded_id! {
    /// Identifier of a topic in the catalog (e.g. `singapore-p5`).
    TopicId
}

branded_id! {
    /// Stable, author-assigned identifier of a content node.
    NodeId
}

branded_id! {
    /// Identifier of one navigation session.
    SessionId
}

impl SessionId {
    /// Create a new random session ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_new_is_uuid_v7() {
        let id = SessionId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::default());
    }

    #[test]
    fn from_str_ref() {
        let id = NodeId::from("intro");
        assert_eq!(id.as_str(), "intro");
    }

    #[test]
    fn compares_with_str() {
        let id = TopicId::from("p5");
        assert!(id == *"p5");
        assert!(id != *"p6");
    }

    #[test]
    fn display() {
        let id = TopicId::from("singapore-p5");
        assert_eq!(format!("{id}"), "singapore-p5");
    }

    #[test]
    fn serde_is_transparent() {
        let id = NodeId::from("q-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"q-1\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn into_inner() {
        let id = NodeId::from("inner");
        assert_eq!(id.into_inner(), "inner");
    }
}
