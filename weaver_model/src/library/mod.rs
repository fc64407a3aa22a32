//! Story library - a snapshot of everything the user has written and defined.

use serde::{Deserialize, Serialize};

use crate::entities::{Character, CharacterId, Relationship, Story, StoryId};

/// All stories, characters, and relationships at a point in time.
///
/// Collections keep the order the writing tool stored them in; several
/// consumers ("first linked character", "first relationship") depend on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoryLibrary {
    pub stories: Vec<Story>,
    pub characters: Vec<Character>,
    pub relationships: Vec<Relationship>,
}

impl StoryLibrary {
    /// Create a new empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get character by ID.
    pub fn get_character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get story by ID.
    pub fn get_story(&self, id: StoryId) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    /// Relationships where the character is either endpoint.
    pub fn relationships_of(&self, id: CharacterId) -> Vec<&Relationship> {
        self.relationships.iter().filter(|r| r.involves(id)).collect()
    }

    /// Average word count across stories, rounded; 0 for an empty library.
    pub fn average_story_length(&self) -> usize {
        if self.stories.is_empty() {
            return 0;
        }
        let total: usize = self.stories.iter().map(|s| s.word_count).sum();
        (total as f64 / self.stories.len() as f64).round() as usize
    }

    /// Add a character to the library.
    pub fn add_character(&mut self, character: Character) -> CharacterId {
        let id = character.id;
        self.characters.push(character);
        id
    }

    /// Add a story to the library.
    pub fn add_story(&mut self, story: Story) -> StoryId {
        let id = story.id;
        self.stories.push(story);
        id
    }

    /// Add a relationship to the library.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }
}
