//! Suggestions for characters and pairings the writer has not explored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use weaver_model::{CharacterId, Relationship};

use super::ConnectionIndex;

/// Maximum number of suggestions returned.
pub const MAX_UNEXPLORED_AREAS: usize = 3;

/// Maximum number of unlinked-character suggestions.
const MAX_UNLINKED: usize = 2;

/// A gap in the writer's narrative world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnexploredArea {
    /// A character that appears in no story.
    UnlinkedCharacter { character: String, suggestion: String },
    /// Two linked characters with no relationship between them.
    PotentialRelationship {
        characters: [String; 2],
        suggestion: String,
    },
}

impl UnexploredArea {
    pub fn suggestion(&self) -> &str {
        match self {
            UnexploredArea::UnlinkedCharacter { suggestion, .. }
            | UnexploredArea::PotentialRelationship { suggestion, .. } => suggestion,
        }
    }
}

impl ConnectionIndex {
    /// Up to three suggestions: unlinked characters first (at most two),
    /// then at most one unrelated pair per linked character.
    pub fn unexplored_areas(&self, relationships: &[Relationship]) -> Vec<UnexploredArea> {
        let mut areas: Vec<UnexploredArea> = self
            .connections()
            .iter()
            .filter(|c| !c.is_linked())
            .take(MAX_UNLINKED)
            .map(|c| UnexploredArea::UnlinkedCharacter {
                character: c.character.name.clone(),
                suggestion: format!(
                    "Write a story featuring {} to bring them into your narrative world",
                    c.character.name
                ),
            })
            .collect();

        let linked = self.characters_in_stories();
        if linked.len() >= 2 {
            let explored: HashSet<(CharacterId, CharacterId)> =
                relationships.iter().map(|r| (r.from, r.to)).collect();
            let related = |a: CharacterId, b: CharacterId| {
                explored.contains(&(a, b)) || explored.contains(&(b, a))
            };

            for (i, first) in linked.iter().enumerate() {
                if let Some(second) = linked[i + 1..].iter().find(|c| !related(first.id, c.id)) {
                    areas.push(UnexploredArea::PotentialRelationship {
                        characters: [first.name.clone(), second.name.clone()],
                        suggestion: format!(
                            "Define the relationship between {} and {} and explore it in a story",
                            first.name, second.name
                        ),
                    });
                }
                if areas.len() >= MAX_UNEXPLORED_AREAS {
                    break;
                }
            }
        }

        areas.truncate(MAX_UNEXPLORED_AREAS);
        areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_model::{Character, Story};

    fn names(areas: &[UnexploredArea]) -> Vec<String> {
        areas
            .iter()
            .map(|a| match a {
                UnexploredArea::UnlinkedCharacter { character, .. } => character.clone(),
                UnexploredArea::PotentialRelationship { characters, .. } => characters.join("+"),
            })
            .collect()
    }

    #[test]
    fn test_unlinked_then_pairs() {
        let stories = vec![Story::new("Docks", "Ada, Bo and Cy met at the docks.")];
        let characters: Vec<_> = ["Ada", "Bo", "Cy", "Dee", "Eli", "Fay"]
            .into_iter()
            .map(Character::new)
            .collect();
        let index = ConnectionIndex::build(&stories, &characters);

        let areas = index.unexplored_areas(&[]);
        assert_eq!(names(&areas), vec!["Dee", "Eli", "Ada+Bo"]);
        assert!(areas[0].suggestion().contains("Dee"));
    }

    #[test]
    fn test_existing_relationship_skipped_either_direction() {
        let stories = vec![Story::new("Docks", "Ada, Bo and Cy met at the docks.")];
        let characters: Vec<_> = ["Ada", "Bo", "Cy"].into_iter().map(Character::new).collect();
        let index = ConnectionIndex::build(&stories, &characters);

        let rels = vec![Relationship::new(characters[1].id, characters[0].id, "rivalry")];
        let areas = index.unexplored_areas(&rels);
        // Ada+Bo is explored, so Ada pairs with Cy; Bo then pairs with Cy
        assert_eq!(names(&areas), vec!["Ada+Cy", "Bo+Cy"]);
    }

    #[test]
    fn test_nothing_to_suggest() {
        let stories = vec![Story::new("Solo", "Ada sat alone.")];
        let characters = vec![Character::new("Ada")];
        let index = ConnectionIndex::build(&stories, &characters);
        assert!(index.unexplored_areas(&[]).is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let area = UnexploredArea::UnlinkedCharacter {
            character: "Dee".into(),
            suggestion: "Write".into(),
        };
        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["type"], "unlinked_character");
        assert_eq!(json["character"], "Dee");
    }
}
