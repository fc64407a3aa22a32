//! Thematic tags extracted from story text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use weaver_model::Story;

/// Themes the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Romance,
    Family,
    Friendship,
    Power,
    Identity,
    Redemption,
    Sacrifice,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Romance => "Romance",
            Theme::Family => "Family",
            Theme::Friendship => "Friendship",
            Theme::Power => "Power",
            Theme::Identity => "Identity",
            Theme::Redemption => "Redemption",
            Theme::Sacrifice => "Sacrifice",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Keyword dictionary for a single text.
pub const THEME_KEYWORDS: &[(&str, Theme)] = &[
    ("love", Theme::Romance),
    ("romantic", Theme::Romance),
    ("family", Theme::Family),
    ("parent", Theme::Family),
    ("friend", Theme::Friendship),
    ("loyalty", Theme::Friendship),
    ("power", Theme::Power),
    ("control", Theme::Power),
    ("identity", Theme::Identity),
    ("self", Theme::Identity),
    ("redemption", Theme::Redemption),
    ("forgiveness", Theme::Redemption),
    ("sacrifice", Theme::Sacrifice),
    ("loss", Theme::Sacrifice),
];

/// Wider dictionary used when ranking themes across a whole corpus.
pub const CORPUS_THEME_KEYWORDS: &[(&str, Theme)] = &[
    ("love", Theme::Romance),
    ("romantic", Theme::Romance),
    ("heart", Theme::Romance),
    ("family", Theme::Family),
    ("parent", Theme::Family),
    ("sibling", Theme::Family),
    ("friend", Theme::Friendship),
    ("loyalty", Theme::Friendship),
    ("betrayal", Theme::Friendship),
    ("power", Theme::Power),
    ("control", Theme::Power),
    ("authority", Theme::Power),
    ("identity", Theme::Identity),
    ("self", Theme::Identity),
    ("discovery", Theme::Identity),
    ("redemption", Theme::Redemption),
    ("forgiveness", Theme::Redemption),
    ("second chance", Theme::Redemption),
    ("sacrifice", Theme::Sacrifice),
    ("loss", Theme::Sacrifice),
    ("choice", Theme::Sacrifice),
];

fn themes_with(dictionary: &[(&str, Theme)], text: &str) -> Vec<Theme> {
    let content = text.to_lowercase();
    let mut themes = Vec::new();
    for (keyword, theme) in dictionary {
        if content.contains(keyword) && !themes.contains(theme) {
            themes.push(*theme);
        }
    }
    themes
}

/// Themes present in a text, deduplicated, in dictionary order.
pub fn extract_themes(text: &str) -> Vec<Theme> {
    themes_with(THEME_KEYWORDS, text)
}

/// The `limit` most common themes across stories.
///
/// Each story counts once per theme. Ties keep first-seen order.
pub fn common_themes(stories: &[Story], limit: usize) -> Vec<Theme> {
    let mut order: Vec<Theme> = Vec::new();
    let mut counts: HashMap<Theme, usize> = HashMap::new();

    for story in stories {
        for theme in themes_with(CORPUS_THEME_KEYWORDS, &story.content) {
            let count = counts.entry(theme).or_insert(0);
            if *count == 0 {
                order.push(theme);
            }
            *count += 1;
        }
    }

    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(limit);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_themes_dedup() {
        let themes = extract_themes("Their LOVE was romantic, a love built on loyalty.");
        assert_eq!(themes, vec![Theme::Romance, Theme::Friendship]);
    }

    #[test]
    fn test_extract_themes_substring_match() {
        // "self" inside "herself", "loss" inside "glossy"
        let themes = extract_themes("She saw herself in the glossy window.");
        assert_eq!(themes, vec![Theme::Identity, Theme::Sacrifice]);
    }

    #[test]
    fn test_extract_themes_empty() {
        assert!(extract_themes("The rain fell.").is_empty());
    }

    #[test]
    fn test_common_themes_ranking() {
        let stories = vec![
            Story::new("One", "A story of power and love."),
            Story::new("Two", "Power corrupts. Authority and control."),
            Story::new("Three", "Her family held the power."),
        ];

        let themes = common_themes(&stories, 5);
        assert_eq!(themes[0], Theme::Power);
        // Romance and Family tie at one story each; Romance was seen first
        assert_eq!(&themes[1..], &[Theme::Romance, Theme::Family]);
    }

    #[test]
    fn test_common_themes_uses_corpus_dictionary() {
        let stories = vec![Story::new("One", "A second chance at the harbor.")];
        assert_eq!(common_themes(&stories, 5), vec![Theme::Redemption]);
    }

    #[test]
    fn test_common_themes_limit() {
        let stories = vec![Story::new(
            "All",
            "love family friend power identity redemption sacrifice",
        )];
        assert_eq!(common_themes(&stories, 5).len(), 5);
    }
}
