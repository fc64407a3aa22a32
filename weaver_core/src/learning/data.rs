//! The persisted learning document.
//!
//! Stored as one camelCase JSON document under a single store key. Every
//! section defaults to empty, so partially shaped or older documents still
//! load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current document layout version.
pub const LEARNING_DATA_VERSION: u32 = 1;

fn current_version() -> u32 {
    LEARNING_DATA_VERSION
}

/// Learning document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningData {
    #[serde(default = "current_version")]
    pub version: u32,

    /// Prompt category -> usage.
    #[serde(default)]
    pub prompt_usage: BTreeMap<String, PromptUsage>,

    /// Character name -> usage.
    #[serde(default)]
    pub character_usage: BTreeMap<String, CharacterUsage>,

    /// Relationship type -> observations.
    #[serde(default)]
    pub relationship_patterns: BTreeMap<String, RelationshipPattern>,

    #[serde(default)]
    pub writing_habits: WritingHabitsLog,

    #[serde(default)]
    pub user_preferences: UserPreferences,

    #[serde(default)]
    pub character_extractions: ExtractionLog,
}

impl Default for LearningData {
    fn default() -> Self {
        Self {
            version: LEARNING_DATA_VERSION,
            prompt_usage: BTreeMap::new(),
            character_usage: BTreeMap::new(),
            relationship_patterns: BTreeMap::new(),
            writing_habits: WritingHabitsLog::default(),
            user_preferences: UserPreferences::default(),
            character_extractions: ExtractionLog::default(),
        }
    }
}

impl LearningData {
    /// Whether every section is empty.
    pub fn is_empty(&self) -> bool {
        self.prompt_usage.is_empty()
            && self.character_usage.is_empty()
            && self.relationship_patterns.is_empty()
            && self.writing_habits == WritingHabitsLog::default()
            && self.user_preferences == UserPreferences::default()
            && self.character_extractions == ExtractionLog::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptUsage {
    pub count: u64,
    /// Most recent prompts of this category, oldest first.
    pub examples: Vec<PromptExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptExample {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterUsage {
    /// Role given on first use.
    pub role: String,
    pub usage_count: u64,
    /// Story label for each use.
    pub stories: Vec<String>,
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipPattern {
    pub count: u64,
    pub character_pairs: Vec<[String; 2]>,
    pub stories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WritingHabitsLog {
    /// Word count of each finished session.
    pub story_lengths: Vec<u64>,
    /// Local hour (0-23) of each finished session.
    pub writing_times: Vec<u32>,
    pub used_prompts: Vec<PromptUse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptUse {
    #[serde(rename = "type")]
    pub prompt_type: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Theme -> prompts used in that theme.
    pub favorite_themes: BTreeMap<String, u64>,
    /// Relationship type -> observations.
    pub favorite_relationships: BTreeMap<String, u64>,
    /// Prompt category -> times generated but not used.
    pub ignored_prompts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionLog {
    pub total_extractions: u64,
    /// Sum of accepted characters over all extractions.
    pub successful_extractions: u64,
    /// Most recent discoveries, oldest first.
    pub characters_found: Vec<DiscoveredCharacter>,
    /// Most recent extraction runs, oldest first.
    pub extraction_history: Vec<ExtractionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub timestamp: DateTime<Utc>,
    pub successful_count: u32,
    pub total_found: u32,
    /// `successful_count / total_found`, 0 when nothing was found.
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredCharacter {
    pub name: String,
    #[serde(default)]
    pub source_story: String,
    pub confidence: f32,
    pub discovered_at: DateTime<Utc>,
}

/// Drop the oldest entries until at most `cap` remain.
pub(crate) fn evict_oldest<T>(log: &mut Vec<T>, cap: usize) {
    if log.len() > cap {
        log.drain(..log.len() - cap);
    }
}
