//! Character definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::CharacterId;

/// Detection path that produced (or last raised the confidence of) an
/// extracted character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Runs of capitalized words, e.g. "Mary Jane" or "Dr. Smith".
    CapitalizedSequence,
    /// Speaker attribution around quoted speech.
    DialogueAttribution,
    /// Name-shaped subject at the start of a sentence.
    SentenceSubject,
    /// Capitalized token repeated across the text.
    RepeatedProperNoun,
}

impl DetectionMethod {
    /// Short label used in logs and exported rosters.
    pub fn label(&self) -> &'static str {
        match self {
            DetectionMethod::CapitalizedSequence => "capitalized_sequence",
            DetectionMethod::DialogueAttribution => "dialogue_attribution",
            DetectionMethod::SentenceSubject => "sentence_subject",
            DetectionMethod::RepeatedProperNoun => "repeated_proper_noun",
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A character, either created by the user or discovered in prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,

    /// Whole-word occurrences of the name in its source text.
    #[serde(default)]
    pub mention_count: u32,

    /// Narrative role label; `None` when nothing was inferred or assigned.
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub source_story: Option<String>,

    /// Detection confidence from 0.0 to 1.0. User-created characters are 1.0.
    #[serde(default = "full_confidence")]
    pub confidence: f32,

    #[serde(default)]
    pub method: Option<DetectionMethod>,

    /// Fields the writing tool stores that the core does not interpret.
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn full_confidence() -> f32 {
    1.0
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            mention_count: 0,
            role: None,
            source_story: None,
            confidence: full_confidence(),
            method: None,
            extra: HashMap::new(),
        }
    }

    /// Set the role label.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the story this character was found in.
    pub fn with_source_story(mut self, source: impl Into<String>) -> Self {
        self.source_story = Some(source.into());
        self
    }

    /// Set the confidence score.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Role label or `fallback` when no role is set.
    pub fn role_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.role.as_deref() {
            Some(role) if !role.is_empty() => role,
            _ => fallback,
        }
    }

    /// Whether this record came out of text extraction.
    pub fn is_extracted(&self) -> bool {
        self.method.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character() {
        let character = Character::new("Elena Martinez");
        assert_eq!(character.name, "Elena Martinez");
        assert_eq!(character.confidence, 1.0);
        assert!(character.role.is_none());
        assert!(!character.is_extracted());
    }

    #[test]
    fn test_role_or() {
        let plain = Character::new("Tom");
        assert_eq!(plain.role_or("character"), "character");

        let empty = Character::new("Tom").with_role("");
        assert_eq!(empty.role_or("character"), "character");

        let mentor = Character::new("Tom").with_role("Mentor");
        assert_eq!(mentor.role_or("character"), "Mentor");
    }

    #[test]
    fn test_confidence_clamping() {
        assert_eq!(Character::new("A").with_confidence(1.5).confidence, 1.0);
        assert_eq!(Character::new("A").with_confidence(-0.5).confidence, 0.0);
    }

    #[test]
    fn test_deserialize_user_record_keeps_unknown_fields() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "name": "Mira",
            "role": "Mentor",
            "description": "Keeper of the lighthouse"
        }"#;

        let character: Character = serde_json::from_str(json).unwrap();
        assert_eq!(character.id, CharacterId::nil());
        assert_eq!(character.confidence, 1.0);
        assert_eq!(character.mention_count, 0);
        assert_eq!(
            character.extra.get("description"),
            Some(&serde_json::Value::from("Keeper of the lighthouse"))
        );

        let back = serde_json::to_value(&character).unwrap();
        assert_eq!(back["description"], "Keeper of the lighthouse");
        assert_eq!(back["mentionCount"], 0);
    }

    #[test]
    fn test_detection_method_serialization() {
        let json = serde_json::to_string(&DetectionMethod::DialogueAttribution).unwrap();
        assert_eq!(json, "\"dialogue_attribution\"");
        assert_eq!(DetectionMethod::SentenceSubject.to_string(), "sentence_subject");
    }
}
