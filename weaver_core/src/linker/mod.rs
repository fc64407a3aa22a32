//! Character-story linker.
//!
//! Links every character to the stories that mention it. The index is
//! rebuilt from scratch on each call; there is no incremental update.

mod areas;

pub use areas::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use weaver_model::{Character, CharacterId, Story, StoryId};

use crate::extraction::count_mentions;

/// One story a character appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMention {
    pub story_id: StoryId,
    pub title: String,
    /// Whole-word, case-insensitive occurrences in the story content.
    pub mention_count: u32,
    pub last_updated: DateTime<Utc>,
}

/// Every story a character appears in, most recently updated first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStoryConnection {
    pub character: Character,
    pub stories: Vec<StoryMention>,
    /// Sum of `mention_count` over `stories`.
    pub total_mentions: u32,
}

impl CharacterStoryConnection {
    /// Whether the character appears in at least one story.
    pub fn is_linked(&self) -> bool {
        !self.stories.is_empty()
    }
}

/// A story together with the characters linked to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryCast<'a> {
    pub story: &'a Story,
    pub characters: Vec<&'a Character>,
}

/// Summary of how well characters and stories are tied together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStats {
    pub connected_characters: usize,
    pub connected_stories: usize,
    /// Linked characters as a rounded percentage of the roster.
    pub integration_rate: u32,
    pub most_active_character: Option<Character>,
    pub richest_story: Option<Story>,
}

/// Character to story membership index.
#[derive(Debug, Clone, Default)]
pub struct ConnectionIndex {
    /// Connections in roster order.
    connections: Vec<CharacterStoryConnection>,

    /// Index: character ID -> slot in `connections`.
    by_character: HashMap<CharacterId, usize>,

    /// Snapshot of the stories the index was built from.
    stories: Vec<Story>,
}

impl ConnectionIndex {
    /// Build the index over a story corpus and a character roster.
    ///
    /// A story is linked when its lowercased title or content contains the
    /// lowercased name. A repeated character ID replaces the earlier entry
    /// in place.
    pub fn build(stories: &[Story], characters: &[Character]) -> Self {
        let mut index = Self {
            connections: Vec::with_capacity(characters.len()),
            by_character: HashMap::with_capacity(characters.len()),
            stories: stories.to_vec(),
        };

        let lowered: Vec<(String, String)> = stories
            .iter()
            .map(|s| (s.title.to_lowercase(), s.content.to_lowercase()))
            .collect();

        for character in characters {
            let name = character.name.to_lowercase();
            let mut mentions: Vec<StoryMention> = Vec::new();

            if !name.is_empty() {
                for (story, (title, content)) in stories.iter().zip(&lowered) {
                    if content.contains(&name) || title.contains(&name) {
                        mentions.push(StoryMention {
                            story_id: story.id,
                            title: story.display_title().to_string(),
                            mention_count: count_mentions(&story.content, &character.name),
                            last_updated: story.updated_at,
                        });
                    }
                }
            }

            mentions.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
            let total_mentions = mentions.iter().map(|m| m.mention_count).sum();

            let connection = CharacterStoryConnection {
                character: character.clone(),
                stories: mentions,
                total_mentions,
            };

            match index.by_character.get(&character.id) {
                Some(&slot) => index.connections[slot] = connection,
                None => {
                    index
                        .by_character
                        .insert(character.id, index.connections.len());
                    index.connections.push(connection);
                }
            }
        }

        debug!(
            "Built character-story connections: {} characters over {} stories",
            index.connections.len(),
            index.stories.len()
        );
        index
    }

    /// All connections, in roster order.
    pub fn connections(&self) -> &[CharacterStoryConnection] {
        &self.connections
    }

    /// Connection for one character.
    pub fn get(&self, id: CharacterId) -> Option<&CharacterStoryConnection> {
        self.by_character.get(&id).map(|&slot| &self.connections[slot])
    }

    /// Stories the index was built over.
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Whether any character is linked to any story.
    pub fn has_linked_characters(&self) -> bool {
        self.connections.iter().any(CharacterStoryConnection::is_linked)
    }

    /// Characters appearing in at least one story, in roster order.
    pub fn characters_in_stories(&self) -> Vec<&Character> {
        self.connections
            .iter()
            .filter(|c| c.is_linked())
            .map(|c| &c.character)
            .collect()
    }

    /// Stories with at least one linked character.
    ///
    /// Stories are ordered by first appearance while walking the roster, each
    /// character's stories most recent first.
    pub fn stories_with_characters(&self) -> Vec<StoryCast<'_>> {
        let mut order: Vec<StoryId> = Vec::new();
        let mut casts: HashMap<StoryId, Vec<&Character>> = HashMap::new();

        for connection in &self.connections {
            for mention in &connection.stories {
                casts
                    .entry(mention.story_id)
                    .or_insert_with(|| {
                        order.push(mention.story_id);
                        Vec::new()
                    })
                    .push(&connection.character);
            }
        }

        order
            .into_iter()
            .filter_map(|id| {
                let story = self.stories.iter().find(|s| s.id == id)?;
                let characters = casts.remove(&id)?;
                Some(StoryCast { story, characters })
            })
            .collect()
    }

    /// Integration summary.
    ///
    /// The most active character and the richest story are the first to
    /// reach the maximum, and require at least one mention or character.
    pub fn integration(&self) -> IntegrationStats {
        let connected_characters = self.characters_in_stories().len();
        let casts = self.stories_with_characters();

        let integration_rate = if self.connections.is_empty() {
            0
        } else {
            (connected_characters as f64 / self.connections.len() as f64 * 100.0).round() as u32
        };

        let mut most_active_character = None;
        let mut max_mentions = 0;
        for connection in &self.connections {
            if connection.total_mentions > max_mentions {
                max_mentions = connection.total_mentions;
                most_active_character = Some(connection.character.clone());
            }
        }

        let mut richest_story = None;
        let mut max_characters = 0;
        for cast in &casts {
            if cast.characters.len() > max_characters {
                max_characters = cast.characters.len();
                richest_story = Some(cast.story.clone());
            }
        }

        IntegrationStats {
            connected_characters,
            connected_stories: casts.len(),
            integration_rate,
            most_active_character,
            richest_story,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    fn corpus() -> (Vec<Story>, Vec<Character>) {
        let stories = vec![
            Story::new("Harbor", "Mira watched the boats. Tom waved to Mira.").with_updated_at(at(1)),
            Story::new("Lighthouse", "Mira climbed the stairs alone.").with_updated_at(at(5)),
            Story::new("Tom's Return", "The sailor came home.").with_updated_at(at(3)),
        ];
        let characters = vec![
            Character::new("Mira"),
            Character::new("Tom"),
            Character::new("Oskar"),
        ];
        (stories, characters)
    }

    #[test]
    fn test_build_links_and_orders_stories() {
        let (stories, characters) = corpus();
        let index = ConnectionIndex::build(&stories, &characters);

        let mira = index.get(characters[0].id).unwrap();
        let titles: Vec<_> = mira.stories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Lighthouse", "Harbor"]);
        assert_eq!(mira.total_mentions, 3);

        // title-only link counts zero content mentions
        let tom = index.get(characters[1].id).unwrap();
        assert_eq!(tom.stories.len(), 2);
        assert_eq!(tom.stories[0].title, "Tom's Return");
        assert_eq!(tom.stories[0].mention_count, 0);
        assert_eq!(tom.total_mentions, 1);

        assert!(!index.get(characters[2].id).unwrap().is_linked());
    }

    #[test]
    fn test_total_mentions_invariant() {
        let (stories, characters) = corpus();
        let index = ConnectionIndex::build(&stories, &characters);

        for connection in index.connections() {
            let sum: u32 = connection.stories.iter().map(|s| s.mention_count).sum();
            assert_eq!(sum, connection.total_mentions);
            assert!(connection
                .stories
                .windows(2)
                .all(|w| w[0].last_updated >= w[1].last_updated));
        }
    }

    #[test]
    fn test_views() {
        let (stories, characters) = corpus();
        let index = ConnectionIndex::build(&stories, &characters);

        assert!(index.has_linked_characters());
        let linked: Vec<_> = index.characters_in_stories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(linked, vec!["Mira", "Tom"]);

        let casts = index.stories_with_characters();
        let titles: Vec<_> = casts.iter().map(|c| c.story.title.as_str()).collect();
        assert_eq!(titles, vec!["Lighthouse", "Harbor", "Tom's Return"]);
        assert_eq!(casts[1].characters.len(), 2);
    }

    #[test]
    fn test_integration() {
        let (stories, characters) = corpus();
        let stats = ConnectionIndex::build(&stories, &characters).integration();

        assert_eq!(stats.connected_characters, 2);
        assert_eq!(stats.connected_stories, 3);
        assert_eq!(stats.integration_rate, 67);
        assert_eq!(stats.most_active_character.unwrap().name, "Mira");
        assert_eq!(stats.richest_story.unwrap().title, "Harbor");
    }

    #[test]
    fn test_empty_index() {
        let index = ConnectionIndex::build(&[], &[]);
        assert!(!index.has_linked_characters());
        assert_eq!(index.integration(), IntegrationStats::default());
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let (stories, _) = corpus();
        let first = Character::new("Mira");
        let second = Character::new("Oskar");
        let mut again = Character::new("Tom");
        again.id = first.id;

        let index = ConnectionIndex::build(&stories, &[first.clone(), second, again]);
        assert_eq!(index.connections().len(), 2);
        assert_eq!(index.connections()[0].character.name, "Tom");
        assert_eq!(index.get(first.id).unwrap().character.name, "Tom");
    }
}
