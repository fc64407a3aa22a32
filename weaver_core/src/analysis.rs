//! Story analyzer facade.
//!
//! Ties extraction, linking, theme analysis and prompt generation together
//! over a [`StoryLibrary`] snapshot.

use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};
use tracing::info;
use weaver_model::{Character, CharacterId, Relationship, Story, StoryLibrary};

use crate::config::ExtractionConfig;
use crate::extraction::CharacterExtractor;
use crate::inference::{common_themes, Theme};
use crate::linker::{ConnectionIndex, IntegrationStats, UnexploredArea};
use crate::prompts::{GeneratedPrompt, PromptContext, PromptGenerator, RngPicker, TemplatePicker};
use crate::store::{load_library, DocumentStore};

/// Source label used when extraction is not tied to a story.
pub const UNKNOWN_STORY: &str = "Unknown Story";

/// Number of corpus themes kept in a report.
pub const COMMON_THEME_LIMIT: usize = 5;

/// How often a character appears across the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAppearance {
    pub name: String,
    /// Stories whose content contains the name.
    pub count: usize,
    pub role: String,
}

/// A relationship with both endpoints resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDynamic {
    /// "A & B".
    pub pair: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub status: String,
    pub description: String,
}

/// Corpus-wide writing report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingPatterns {
    pub total_stories: usize,
    pub total_characters: usize,
    pub characters_in_stories: usize,
    pub stories_with_characters: usize,
    pub average_story_length: usize,
    pub common_themes: Vec<Theme>,
    pub character_usage: Vec<CharacterAppearance>,
    pub relationship_dynamics: Vec<RelationshipDynamic>,
    pub unexplored_areas: Vec<UnexploredArea>,
    pub character_story_integration: IntegrationStats,
}

/// Entry point for story analysis.
#[derive(Debug, Clone, Default)]
pub struct StoryAnalyzer<P: TemplatePicker = RngPicker<ThreadRng>> {
    extractor: CharacterExtractor,
    prompts: PromptGenerator<P>,
}

impl StoryAnalyzer {
    /// Analyzer with thread-local randomness for prompts.
    pub fn new(config: ExtractionConfig) -> Self {
        Self::with_picker(config, RngPicker::thread())
    }
}

impl<P: TemplatePicker> StoryAnalyzer<P> {
    pub fn with_picker(config: ExtractionConfig, picker: P) -> Self {
        Self {
            extractor: CharacterExtractor::new(config),
            prompts: PromptGenerator::with_picker(picker),
        }
    }

    pub fn extractor(&self) -> &CharacterExtractor {
        &self.extractor
    }

    pub fn prompts_mut(&mut self) -> &mut PromptGenerator<P> {
        &mut self.prompts
    }

    /// Ranked probable characters in `text`.
    pub fn extract_characters_from_text(&self, text: &str, source_story: Option<&str>) -> Vec<Character> {
        let source = source_story.unwrap_or(UNKNOWN_STORY);
        self.extractor.extract(text, Some(source))
    }

    /// Rebuild the character-story index.
    pub fn build_character_story_connections(
        &self,
        stories: &[Story],
        characters: &[Character],
    ) -> ConnectionIndex {
        ConnectionIndex::build(stories, characters)
    }

    /// Full report over a library snapshot.
    pub fn analyze_writing_patterns(&self, library: &StoryLibrary) -> WritingPatterns {
        let index = self.build_character_story_connections(&library.stories, &library.characters);
        let integration = index.integration();

        let patterns = WritingPatterns {
            total_stories: library.stories.len(),
            total_characters: library.characters.len(),
            characters_in_stories: integration.connected_characters,
            stories_with_characters: integration.connected_stories,
            average_story_length: library.average_story_length(),
            common_themes: common_themes(&library.stories, COMMON_THEME_LIMIT),
            character_usage: character_usage(&library.stories, &library.characters),
            relationship_dynamics: relationship_dynamics(&library.relationships, &library.characters),
            unexplored_areas: index.unexplored_areas(&library.relationships),
            character_story_integration: integration,
        };

        info!(
            "Analyzed {} stories and {} characters ({}% integrated)",
            patterns.total_stories,
            patterns.total_characters,
            patterns.character_story_integration.integration_rate
        );
        patterns
    }

    /// Report over the library documents held in a store.
    pub fn analyze_store(&self, store: &dyn DocumentStore) -> WritingPatterns {
        self.analyze_writing_patterns(&load_library(store))
    }

    /// Character or relationship prompt for the library.
    pub fn generate_prompt(&mut self, library: &StoryLibrary) -> GeneratedPrompt {
        let index = ConnectionIndex::build(&library.stories, &library.characters);
        let themes = common_themes(&library.stories, COMMON_THEME_LIMIT);
        let ctx = PromptContext {
            index: &index,
            characters: &library.characters,
            relationships: &library.relationships,
            common_themes: &themes,
        };
        self.prompts.integrated_prompt(&ctx)
    }

    /// Prompt continuing a story from the library.
    pub fn generate_story_prompt(&mut self, library: &StoryLibrary) -> GeneratedPrompt {
        let index = ConnectionIndex::build(&library.stories, &library.characters);
        let themes = common_themes(&library.stories, COMMON_THEME_LIMIT);
        let ctx = PromptContext {
            index: &index,
            characters: &library.characters,
            relationships: &library.relationships,
            common_themes: &themes,
        };
        self.prompts.story_driven_prompt(&ctx)
    }
}

/// Story counts per character, in roster order, for characters that appear.
pub fn character_usage(stories: &[Story], characters: &[Character]) -> Vec<CharacterAppearance> {
    let contents: Vec<String> = stories.iter().map(|s| s.content.to_lowercase()).collect();

    characters
        .iter()
        .filter_map(|character| {
            let name = character.name.to_lowercase();
            if name.is_empty() {
                return None;
            }
            let count = contents.iter().filter(|c| c.contains(&name)).count();
            (count > 0).then(|| CharacterAppearance {
                name: character.name.clone(),
                count,
                role: character.role_or("Unknown").to_string(),
            })
        })
        .collect()
}

/// Relationships whose endpoints both resolve, in list order.
pub fn relationship_dynamics(
    relationships: &[Relationship],
    characters: &[Character],
) -> Vec<RelationshipDynamic> {
    let find = |id: CharacterId| characters.iter().find(|c| c.id == id);

    relationships
        .iter()
        .filter_map(|rel| {
            let from = find(rel.from)?;
            let to = find(rel.to)?;
            Some(RelationshipDynamic {
                pair: format!("{} & {}", from.name, to.name),
                relationship_type: rel.relationship_type.clone(),
                status: rel.status.clone(),
                description: rel.description.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{PromptCategory, ScriptedPicker};

    fn library() -> StoryLibrary {
        let mut library = StoryLibrary::new();
        let mira = library.add_character(Character::new("Mira").with_role("Mentor"));
        let tom = library.add_character(Character::new("Tom"));
        library.add_character(Character::new("Oskar"));
        library.add_story(Story::new("Harbor", "Mira taught Tom about loyalty and love."));
        library.add_story(Story::new("Storm", "Mira faced the power of the sea."));
        library.add_relationship(
            Relationship::new(mira, tom, "mentorship")
                .with_status("growing")
                .with_description("Lessons at dawn"),
        );
        library.add_relationship(Relationship::new(tom, CharacterId::new(), "rivalry"));
        library
    }

    #[test]
    fn test_extract_defaults_source_story() {
        let analyzer = StoryAnalyzer::new(ExtractionConfig::default());
        let roster = analyzer.extract_characters_from_text("\"Go,\" said Elena Martinez.", None);
        assert_eq!(roster[0].source_story.as_deref(), Some(UNKNOWN_STORY));

        let roster = analyzer.extract_characters_from_text("\"Go,\" said Elena Martinez.", Some("Ch. 1"));
        assert_eq!(roster[0].source_story.as_deref(), Some("Ch. 1"));
    }

    #[test]
    fn test_character_usage() {
        let library = library();
        let usage = character_usage(&library.stories, &library.characters);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].name, "Mira");
        assert_eq!(usage[0].count, 2);
        assert_eq!(usage[0].role, "Mentor");
        assert_eq!(usage[1].role, "Unknown");
    }

    #[test]
    fn test_relationship_dynamics_skip_dangling() {
        let library = library();
        let dynamics = relationship_dynamics(&library.relationships, &library.characters);
        assert_eq!(dynamics.len(), 1);
        assert_eq!(dynamics[0].pair, "Mira & Tom");
        assert_eq!(dynamics[0].status, "growing");
    }

    #[test]
    fn test_analyze_writing_patterns() {
        let library = library();
        let analyzer = StoryAnalyzer::new(ExtractionConfig::default());
        let patterns = analyzer.analyze_writing_patterns(&library);

        assert_eq!(patterns.total_stories, 2);
        assert_eq!(patterns.total_characters, 3);
        assert_eq!(patterns.characters_in_stories, 2);
        assert_eq!(patterns.stories_with_characters, 2);
        assert_eq!(patterns.character_story_integration.integration_rate, 67);
        assert_eq!(patterns.common_themes[0], Theme::Romance);
        assert!(patterns.common_themes.contains(&Theme::Power));
        assert!(matches!(
            &patterns.unexplored_areas[0],
            UnexploredArea::UnlinkedCharacter { character, .. } if character == "Oskar"
        ));
        // Mira and Tom already have a relationship
        assert_eq!(patterns.unexplored_areas.len(), 1);
    }

    #[test]
    fn test_analyze_store() {
        let mut store = crate::store::MemoryStore::new();
        let library = library();
        crate::store::save_collection(&mut store, crate::store::STORIES_KEY, &library.stories).unwrap();
        crate::store::save_collection(&mut store, crate::store::CHARACTERS_KEY, &library.characters)
            .unwrap();

        let analyzer = StoryAnalyzer::new(ExtractionConfig::default());
        let patterns = analyzer.analyze_store(&store);
        assert_eq!(patterns.total_stories, 2);
        assert!(patterns.relationship_dynamics.is_empty());
    }

    #[test]
    fn test_generate_prompts() {
        let library = library();
        let mut analyzer =
            StoryAnalyzer::with_picker(ExtractionConfig::default(), ScriptedPicker::new([0, 0]));

        let prompt = analyzer.generate_prompt(&library);
        assert_eq!(prompt.category, PromptCategory::CharacterDevelopment);
        assert!(prompt.text.starts_with("Continue Mira's story"));

        let story = analyzer.generate_story_prompt(&library);
        assert_eq!(story.category, PromptCategory::StoryContinuation);
        assert!(story.text.starts_with("Continue the story of Mira"));
    }
}
