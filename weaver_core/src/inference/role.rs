//! Narrative roles inferred from context.

use serde::{Deserialize, Serialize};

/// Role labels the inferencer can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterRole {
    Protagonist,
    Antagonist,
    Mentor,
    LoveInterest,
    Friend,
    Family,
}

impl CharacterRole {
    /// All roles in matching priority order.
    pub const ALL: [CharacterRole; 6] = [
        CharacterRole::Protagonist,
        CharacterRole::Antagonist,
        CharacterRole::Mentor,
        CharacterRole::LoveInterest,
        CharacterRole::Friend,
        CharacterRole::Family,
    ];

    /// Display label stored on character records.
    pub fn label(&self) -> &'static str {
        match self {
            CharacterRole::Protagonist => "Protagonist",
            CharacterRole::Antagonist => "Antagonist",
            CharacterRole::Mentor => "Mentor",
            CharacterRole::LoveInterest => "Love Interest",
            CharacterRole::Friend => "Friend",
            CharacterRole::Family => "Family",
        }
    }

    /// Lowercase keywords that signal this role.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            CharacterRole::Protagonist => &["hero", "main character", "protagonist"],
            CharacterRole::Antagonist => &["villain", "enemy", "antagonist", "evil"],
            CharacterRole::Mentor => &["teacher", "mentor", "wise", "old man", "guide"],
            CharacterRole::LoveInterest => &["lover", "beloved", "sweetheart", "romantic"],
            CharacterRole::Friend => &["friend", "buddy", "companion", "ally"],
            CharacterRole::Family => &["father", "mother", "brother", "sister", "son", "daughter"],
        }
    }

    /// Parse a display label back into a role.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for CharacterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Infer a role for `name` from the text it appears in.
///
/// A role matches when the lowercased text contains both the name and one of
/// the role's keywords anywhere; the first matching role wins.
pub fn infer_role(name: &str, text: &str) -> Option<CharacterRole> {
    let lower_text = text.to_lowercase();
    let lower_name = name.to_lowercase();

    if lower_name.is_empty() || !lower_text.contains(&lower_name) {
        return None;
    }

    CharacterRole::ALL.into_iter().find(|role| {
        role.keywords()
            .iter()
            .any(|keyword| lower_text.contains(keyword))
    })
}
