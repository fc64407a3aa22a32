//! Relationships between characters, defined by the user.

use serde::{Deserialize, Serialize};

use super::CharacterId;

/// A directed relationship between two characters.
///
/// Endpoints may reference characters that no longer exist; consumers treat
/// that as a soft miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: CharacterId,
    pub to: CharacterId,
    /// Free-form kind, e.g. "friendship" or "rivalry".
    #[serde(rename = "type")]
    pub relationship_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
}

impl Relationship {
    /// Create a relationship of the given kind.
    pub fn new(from: CharacterId, to: CharacterId, relationship_type: impl Into<String>) -> Self {
        Self {
            from,
            to,
            relationship_type: relationship_type.into(),
            status: String::new(),
            description: String::new(),
        }
    }

    /// Set the status (e.g. "strained", "growing").
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check if a character is one of the endpoints.
    pub fn involves(&self, id: CharacterId) -> bool {
        self.from == id || self.to == id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other_endpoint(&self, id: CharacterId) -> Option<CharacterId> {
        if self.from == id {
            Some(self.to)
        } else if self.to == id {
            Some(self.from)
        } else {
            None
        }
    }
}
