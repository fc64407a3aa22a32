//! Read-only aggregate queries over the learning document.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::data::{ExtractionRecord, LearningData};

/// Hour ranges used to find the preferred writing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
    LateNight,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 5] = [
        TimeBucket::EarlyMorning,
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::LateNight,
    ];

    /// Bucket containing a local hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            4..=7 => TimeBucket::EarlyMorning,
            8..=11 => TimeBucket::Morning,
            12..=16 => TimeBucket::Afternoon,
            17..=20 => TimeBucket::Evening,
            _ => TimeBucket::LateNight,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::EarlyMorning => "Early Morning (4-8 AM)",
            TimeBucket::Morning => "Morning (8-12 PM)",
            TimeBucket::Afternoon => "Afternoon (12-5 PM)",
            TimeBucket::Evening => "Evening (5-9 PM)",
            TimeBucket::LateNight => "Late Night (9 PM-4 AM)",
        }
    }
}

/// Label reported when no session has been recorded.
pub const UNKNOWN_TIME: &str = "Unknown";

/// Prompt category substrings and the theme they indicate, in match order.
pub const CATEGORY_THEMES: &[(&str, &str)] = &[
    ("romantic", "Love & Relationships"),
    ("family", "Family & Heritage"),
    ("friendship", "Friendship & Loyalty"),
    ("rivalry", "Conflict & Competition"),
    ("mentorship", "Growth & Learning"),
    ("betrayal", "Trust & Betrayal"),
    ("redemption", "Redemption & Forgiveness"),
    ("identity", "Identity & Self-Discovery"),
];

/// Theme suggested by a prompt category label, if any.
pub fn theme_for_category(category: &str) -> Option<&'static str> {
    let lower = category.to_lowercase();
    CATEGORY_THEMES
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map(|(_, theme)| *theme)
}

/// Most populated bucket label, first bucket on ties.
pub fn preferred_writing_time(hours: &[u32]) -> &'static str {
    let mut counts = [0usize; TimeBucket::ALL.len()];
    for &hour in hours {
        counts[TimeBucket::from_hour(hour) as usize] += 1;
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }

    if counts[best] == 0 {
        UNKNOWN_TIME
    } else {
        TimeBucket::ALL[best].label()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTypeUsage {
    #[serde(rename = "type")]
    pub prompt_type: String,
    pub count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCharacter {
    pub name: String,
    pub role: String,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPatternSummary {
    #[serde(rename = "type")]
    pub pattern_type: String,
    pub frequency: u64,
    /// Distinct ordered character pairs observed.
    pub unique_pairs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingHabits {
    /// Rounded mean session length in words.
    pub average_story_length: u64,
    pub total_stories: usize,
    pub preferred_writing_time: String,
    pub prompts_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub theme: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub total_extractions: u64,
    pub successful_extractions: u64,
    /// Mean success rate over the recent window, as a rounded percentage.
    pub average_success_rate: u32,
    pub recent_extractions: Vec<ExtractionRecord>,
    pub total_characters_discovered: usize,
}

/// Every insight query in one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternInsights {
    pub most_used_prompt_types: Vec<PromptTypeUsage>,
    pub favorite_characters: Vec<FavoriteCharacter>,
    pub common_relationship_patterns: Vec<RelationshipPatternSummary>,
    pub writing_habits: WritingHabits,
    pub theme_preferences: Vec<ThemePreference>,
    pub extraction_stats: ExtractionStats,
}

/// Event count for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

fn per_local_day<'a>(timestamps: impl Iterator<Item = &'a DateTime<Utc>>) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in timestamps {
        *days.entry(ts.with_timezone(&Local).date_naive()).or_insert(0) += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

// Ranked queries sort stably over the key order of the document maps, so
// ties resolve alphabetically.
impl LearningData {
    /// Prompt categories by use count, with the time of the latest example.
    pub fn most_used_prompt_types(&self, limit: usize) -> Vec<PromptTypeUsage> {
        let mut types: Vec<PromptTypeUsage> = self
            .prompt_usage
            .iter()
            .map(|(prompt_type, usage)| PromptTypeUsage {
                prompt_type: prompt_type.clone(),
                count: usage.count,
                last_used: usage.examples.last().map(|e| e.timestamp),
            })
            .collect();
        types.sort_by(|a, b| b.count.cmp(&a.count));
        types.truncate(limit);
        types
    }

    pub fn favorite_characters(&self, limit: usize) -> Vec<FavoriteCharacter> {
        let mut characters: Vec<FavoriteCharacter> = self
            .character_usage
            .iter()
            .map(|(name, usage)| FavoriteCharacter {
                name: name.clone(),
                role: usage.role.clone(),
                usage_count: usage.usage_count,
                last_used: usage.last_used,
            })
            .collect();
        characters.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        characters.truncate(limit);
        characters
    }

    pub fn common_relationship_patterns(&self, limit: usize) -> Vec<RelationshipPatternSummary> {
        let mut patterns: Vec<RelationshipPatternSummary> = self
            .relationship_patterns
            .iter()
            .map(|(pattern_type, pattern)| {
                let pairs: HashSet<&[String; 2]> = pattern.character_pairs.iter().collect();
                RelationshipPatternSummary {
                    pattern_type: pattern_type.clone(),
                    frequency: pattern.count,
                    unique_pairs: pairs.len(),
                }
            })
            .collect();
        patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        patterns.truncate(limit);
        patterns
    }

    pub fn writing_habits(&self) -> WritingHabits {
        let lengths = &self.writing_habits.story_lengths;
        let average_story_length = if lengths.is_empty() {
            0
        } else {
            (lengths.iter().sum::<u64>() as f64 / lengths.len() as f64).round() as u64
        };

        WritingHabits {
            average_story_length,
            total_stories: lengths.len(),
            preferred_writing_time: preferred_writing_time(&self.writing_habits.writing_times)
                .to_string(),
            prompts_used: self.writing_habits.used_prompts.len(),
        }
    }

    /// Prompt use summed per theme, via the category substring map.
    pub fn theme_preferences(&self, limit: usize) -> Vec<ThemePreference> {
        let mut order: Vec<&'static str> = Vec::new();
        let mut totals: BTreeMap<&'static str, u64> = BTreeMap::new();

        for (category, usage) in &self.prompt_usage {
            if let Some(theme) = theme_for_category(category) {
                if !totals.contains_key(theme) {
                    order.push(theme);
                }
                *totals.entry(theme).or_insert(0) += usage.count;
            }
        }

        let mut themes: Vec<ThemePreference> = order
            .into_iter()
            .map(|theme| ThemePreference {
                theme: theme.to_string(),
                count: totals[theme],
            })
            .collect();
        themes.sort_by(|a, b| b.count.cmp(&a.count));
        themes.truncate(limit);
        themes
    }

    /// Totals plus the mean success rate over the last `window` runs.
    pub fn extraction_stats(&self, window: usize) -> ExtractionStats {
        let log = &self.character_extractions;
        let start = log.extraction_history.len().saturating_sub(window);
        let recent = &log.extraction_history[start..];

        let average = if recent.is_empty() {
            0.0
        } else {
            recent.iter().map(|r| r.success_rate).sum::<f64>() / recent.len() as f64
        };

        ExtractionStats {
            total_extractions: log.total_extractions,
            successful_extractions: log.successful_extractions,
            average_success_rate: (average * 100.0).round() as u32,
            recent_extractions: recent.to_vec(),
            total_characters_discovered: log.characters_found.len(),
        }
    }

    /// Prompts used per local day, oldest first, keeping the latest `days`
    /// active days.
    pub fn writing_progress(&self, days: usize) -> Vec<DailyCount> {
        let mut progress = per_local_day(self.writing_habits.used_prompts.iter().map(|p| &p.timestamp));
        let start = progress.len().saturating_sub(days);
        progress.drain(..start);
        progress
    }

    /// Characters discovered per local day, oldest first.
    pub fn discovery_timeline(&self) -> Vec<DailyCount> {
        per_local_day(
            self.character_extractions
                .characters_found
                .iter()
                .map(|c| &c.discovered_at),
        )
    }
}
