//! Writing prompt generation.
//!
//! Every decision point builds a list of candidate templates and lets the
//! [`TemplatePicker`] choose one, so generation is deterministic under a
//! scripted or seeded picker. Fallbacks chain from the most specific prompt
//! down to a purely thematic one:
//!
//! integrated -> relationship -> character introduction -> thematic
//! story driven -> story continuation

mod picker;

pub use picker::*;

use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use weaver_model::{Character, Relationship};

use crate::inference::{extract_themes, Theme};
use crate::linker::ConnectionIndex;

/// Themes offered when nothing more specific is available.
pub const FALLBACK_THEMES: &[&str] = &[
    "self-discovery",
    "redemption",
    "sacrifice",
    "betrayal",
    "hope",
    "identity",
];

/// Kind of prompt produced, reported back to the tracker as its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    /// Built around a character already linked to stories.
    CharacterDevelopment,
    Relationship,
    CharacterIntroduction,
    Thematic,
    /// Continues a story with linked characters.
    StoryContinuation,
}

impl PromptCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PromptCategory::CharacterDevelopment => "character_development",
            PromptCategory::Relationship => "relationship",
            PromptCategory::CharacterIntroduction => "character_introduction",
            PromptCategory::Thematic => "thematic",
            PromptCategory::StoryContinuation => "story_continuation",
        }
    }
}

impl std::fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A generated prompt and the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub text: String,
    pub category: PromptCategory,
}

impl GeneratedPrompt {
    fn new(text: String, category: PromptCategory) -> Self {
        Self { text, category }
    }
}

/// Everything prompt generation reads.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Connections rebuilt over the current stories and roster.
    pub index: &'a ConnectionIndex,
    pub characters: &'a [Character],
    pub relationships: &'a [Relationship],
    /// Corpus themes, most common first.
    pub common_themes: &'a [Theme],
}

impl<'a> PromptContext<'a> {
    fn find_character(&self, id: weaver_model::CharacterId) -> Option<&'a Character> {
        self.characters.iter().find(|c| c.id == id)
    }
}

/// Prompt generator over a pluggable template picker.
#[derive(Debug, Clone, Default)]
pub struct PromptGenerator<P: TemplatePicker = RngPicker<ThreadRng>> {
    picker: P,
}

impl PromptGenerator {
    /// Generator with thread-local randomness.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: TemplatePicker> PromptGenerator<P> {
    pub fn with_picker(picker: P) -> Self {
        Self { picker }
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    /// Picker choice clamped into `0..len`; callers ensure `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize {
        self.picker.pick(len).min(len.saturating_sub(1))
    }

    fn choose(&mut self, mut templates: Vec<String>, category: PromptCategory) -> GeneratedPrompt {
        let i = self.pick_index(templates.len());
        debug!("Picked {} template {} of {}", category, i, templates.len());
        GeneratedPrompt::new(templates.swap_remove(i), category)
    }

    /// Prompt for the first linked character, or a relationship prompt when
    /// no character appears in any story.
    pub fn integrated_prompt(&mut self, ctx: &PromptContext<'_>) -> GeneratedPrompt {
        let linked = ctx.index.characters_in_stories();
        let Some(active) = linked.first().copied() else {
            return self.relationship_prompt(ctx);
        };

        let name = &active.name;
        let role = active.role_or("character").to_lowercase();
        let mut templates = vec![
            format!("Continue {name}'s story from where you left off, exploring new challenges that test their {role}"),
            format!("Write a new chapter for {name} that builds upon their established personality and relationships"),
            format!("Create a scene where {name} faces a situation that contrasts with their previous experiences"),
            format!("Explore {name}'s untapped potential by placing them in an unexpected scenario"),
            format!("Write about a moment of growth or change for {name}, considering their established traits"),
        ];

        let partner = ctx
            .relationships
            .iter()
            .find(|r| r.involves(active.id))
            .and_then(|r| {
                let other = ctx.find_character(r.other_endpoint(active.id)?)?;
                Some((r, other))
            });

        if let Some((relationship, other)) = partner {
            let kind = &relationship.relationship_type;
            let other = &other.name;
            templates.extend([
                format!("Deepen the {kind} between {name} and {other} through a shared challenge"),
                format!("Write about a turning point in {name} and {other}'s {kind} relationship"),
                format!("Explore how {name}'s relationship with {other} influences their personal journey"),
            ]);
        }

        self.choose(templates, PromptCategory::CharacterDevelopment)
    }

    /// Conflict prompt around one random relationship.
    ///
    /// Falls back to a character introduction when there are no
    /// relationships, and to a thematic prompt when an endpoint is missing.
    pub fn relationship_prompt(&mut self, ctx: &PromptContext<'_>) -> GeneratedPrompt {
        if ctx.relationships.is_empty() {
            return self.character_introduction_prompt(ctx.characters);
        }

        let relationship = &ctx.relationships[self.pick_index(ctx.relationships.len())];
        let (Some(first), Some(second)) = (
            ctx.find_character(relationship.from),
            ctx.find_character(relationship.to),
        ) else {
            debug!("Relationship endpoint missing, using a thematic prompt");
            return self.thematic_prompt();
        };

        let a = &first.name;
        let b = &second.name;
        let kind = &relationship.relationship_type;
        let status = if relationship.status.trim().is_empty() {
            String::new()
        } else {
            format!("{} ", relationship.status.trim())
        };

        let templates = vec![
            format!("Write about a moment that tests the {kind} between {a} and {b}"),
            format!("Explore how {a} and {b}'s {kind} relationship changes when faced with a difficult choice"),
            format!("Describe a secret that {a} has been keeping from {b} and how it affects their {kind}"),
            format!("Write a scene where {a} must choose between their {kind} with {b} and their personal goals"),
            format!("How does the {status}{kind} between {a} and {b} evolve when outside pressures mount?"),
        ];

        self.choose(templates, PromptCategory::Relationship)
    }

    /// Introduction for one random character; thematic when the roster is empty.
    pub fn character_introduction_prompt(&mut self, characters: &[Character]) -> GeneratedPrompt {
        if characters.is_empty() {
            return self.thematic_prompt();
        }

        let character = &characters[self.pick_index(characters.len())];
        let name = &character.name;
        let (described, appositive) = match character.role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => (format!("a {role}"), format!(", the {role}")),
            _ => ("a compelling character".to_string(), String::new()),
        };

        let templates = vec![
            format!("Write a story introducing {name}, {described}"),
            format!("Explore a day in the life of {name}{appositive}"),
            format!("Write about a pivotal moment that defines {name}'s character"),
            format!("Create a story where {name} faces a challenge that reveals their true nature"),
        ];

        self.choose(templates, PromptCategory::CharacterIntroduction)
    }

    pub fn thematic_prompt(&mut self) -> GeneratedPrompt {
        let theme = FALLBACK_THEMES[self.pick_index(FALLBACK_THEMES.len())];
        GeneratedPrompt::new(
            format!("Write a story exploring themes of {theme} through character relationships and personal growth"),
            PromptCategory::Thematic,
        )
    }

    /// Continue the most recently updated story that has linked characters.
    pub fn story_driven_prompt(&mut self, ctx: &PromptContext<'_>) -> GeneratedPrompt {
        let casts = ctx.index.stories_with_characters();
        let recent = casts.iter().reduce(|best, cast| {
            if cast.story.updated_at > best.story.updated_at {
                cast
            } else {
                best
            }
        });
        let Some(recent) = recent else {
            return self.story_continuation_prompt(ctx.common_themes);
        };

        let theme = extract_themes(&recent.story.content)
            .first()
            .map(|t| t.label().to_lowercase())
            .unwrap_or_else(|| "personal journey".to_string());
        let names = recent
            .characters
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" and ");

        let templates = vec![
            format!("Continue the story of {names}, exploring deeper themes of {theme}"),
            format!("Write a new scene featuring {names} that introduces a fresh perspective on {theme}"),
            format!("Create a parallel storyline for {names} that complements their established narrative"),
            format!("Explore what happens when {names} encounter a situation that challenges their usual dynamics"),
        ];

        self.choose(templates, PromptCategory::StoryContinuation)
    }

    /// Continuation built on the most common corpus theme.
    pub fn story_continuation_prompt(&mut self, common_themes: &[Theme]) -> GeneratedPrompt {
        let theme = common_themes
            .first()
            .map(|t| t.label().to_lowercase())
            .unwrap_or_else(|| "personal growth".to_string());

        let templates = vec![
            format!("Continue your story exploring {theme} through a new challenge"),
            format!("Write a sequel scene that deepens the themes of {theme} from your previous work"),
            format!("Create a new story that builds upon the {theme} themes you've been developing"),
            format!("Explore a different perspective on {theme} through a new character or situation"),
        ];

        self.choose(templates, PromptCategory::StoryContinuation)
    }
}
