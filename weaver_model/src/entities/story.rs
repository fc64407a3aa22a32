//! Story records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoryId;

/// A piece of writing saved by the user.
///
/// The core treats stories as opaque apart from these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub word_count: usize,
}

impl Story {
    /// Create a story, deriving the word count from the content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: StoryId::new(),
            title: title.into(),
            word_count: content.split_whitespace().count(),
            content,
            updated_at: Utc::now(),
        }
    }

    /// Set the last-updated timestamp.
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Title for display, "Untitled" when blank.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_word_count() {
        let story = Story::new("Harbor", "The fog rolled in  over the\nharbor.");
        assert_eq!(story.word_count, 7);
    }

    #[test]
    fn test_display_title() {
        assert_eq!(Story::new("  ", "text").display_title(), "Untitled");
        assert_eq!(Story::new("Harbor", "text").display_title(), "Harbor");
    }

    #[test]
    fn test_story_json_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut story = Story::new("Harbor", "Mira waited.").with_updated_at(at);
        story.id = StoryId::nil();

        let value = serde_json::to_value(&story).unwrap();
        assert_eq!(value["updatedAt"], "2024-05-01T12:00:00Z");
        assert_eq!(value["wordCount"], 2);

        let back: Story = serde_json::from_value(value).unwrap();
        assert_eq!(back, story);
    }
}
