//! Usage tracker over the learning document.

use chrono::{NaiveDate, Timelike, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::data::{
    evict_oldest, CharacterUsage, DiscoveredCharacter, ExtractionRecord, LearningData,
    PromptExample, PromptUse,
};
use super::insights::{
    theme_for_category, DailyCount, ExtractionStats, FavoriteCharacter, PatternInsights,
    PromptTypeUsage, RelationshipPatternSummary, ThemePreference, WritingHabits,
};
use crate::config::TrackerConfig;
use crate::error::{Result, WeaverError};
use crate::store::{DocumentStore, LEARNING_DATA_KEY};

/// Backup file name for a given day.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("ml_learning_data_{}.json", date.format("%Y-%m-%d"))
}

/// Records usage events and answers insight queries.
///
/// The whole document lives in memory. Every record operation mutates it and
/// then writes the entire document back to the store; there are no partial
/// writes. Only one tracker should own a store at a time.
#[derive(Debug)]
pub struct LearningTracker<S: DocumentStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    config: TrackerConfig,
    data: LearningData,
}

impl<S: DocumentStore> LearningTracker<S> {
    /// Open a tracker on the wall clock.
    pub fn open(store: S, config: TrackerConfig) -> Result<Self> {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: DocumentStore, C: Clock> LearningTracker<S, C> {
    /// Open a tracker, loading the stored document.
    ///
    /// A missing document is created zeroed and persisted. An unreadable or
    /// malformed one is replaced the same way, with a warning.
    pub fn with_clock(store: S, config: TrackerConfig, clock: C) -> Result<Self> {
        let loaded = match store.get(LEARNING_DATA_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<LearningData>(&text) {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!("Malformed learning data, starting fresh: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read learning data, starting fresh: {}", e);
                None
            }
        };

        let fresh = loaded.is_none();
        let mut tracker = Self {
            store,
            clock,
            config,
            data: loaded.unwrap_or_default(),
        };

        if fresh {
            tracker.persist()?;
        }
        Ok(tracker)
    }

    /// Current in-memory document.
    pub fn data(&self) -> &LearningData {
        &self.data
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Write the whole document to the store.
    pub fn persist(&mut self) -> Result<()> {
        let text = serde_json::to_string(&self.data)?;
        self.store.put(LEARNING_DATA_KEY, &text)
    }

    fn now_utc(&self) -> chrono::DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    // -- Recording --------------------------------------------------------

    /// A generated prompt was used.
    pub fn record_prompt_used(&mut self, text: &str, category: &str) -> Result<()> {
        let timestamp = self.now_utc();
        let cap = self.config.example_cap;

        let usage = self.data.prompt_usage.entry(category.to_string()).or_default();
        usage.count += 1;
        usage.examples.push(PromptExample {
            text: text.to_string(),
            timestamp,
            used: true,
        });
        evict_oldest(&mut usage.examples, cap);

        self.data.writing_habits.used_prompts.push(PromptUse {
            prompt_type: category.to_string(),
            timestamp,
        });

        if let Some(theme) = theme_for_category(category) {
            *self
                .data
                .user_preferences
                .favorite_themes
                .entry(theme.to_string())
                .or_insert(0) += 1;
        }

        self.persist()?;
        debug!("Tracked prompt usage - {}", category);
        Ok(())
    }

    /// A generated prompt was dismissed.
    pub fn record_prompt_ignored(&mut self, category: &str) -> Result<()> {
        *self
            .data
            .user_preferences
            .ignored_prompts
            .entry(category.to_string())
            .or_insert(0) += 1;

        self.persist()?;
        debug!("Tracked ignored prompt - {}", category);
        Ok(())
    }

    /// A character was used in a story. The role of the first use sticks.
    pub fn record_character_usage(&mut self, name: &str, role: &str, story: &str) -> Result<()> {
        let now = self.now_utc();
        let usage = self
            .data
            .character_usage
            .entry(name.to_string())
            .or_insert_with(|| CharacterUsage {
                role: role.to_string(),
                ..Default::default()
            });
        usage.usage_count += 1;
        usage.stories.push(story.to_string());
        usage.last_used = Some(now);

        self.persist()?;
        debug!("Tracked character usage - {}", name);
        Ok(())
    }

    /// A relationship of `kind` between two characters appeared in a story.
    pub fn record_relationship_pattern(
        &mut self,
        kind: &str,
        characters: (&str, &str),
        story: &str,
    ) -> Result<()> {
        let pattern = self
            .data
            .relationship_patterns
            .entry(kind.to_string())
            .or_default();
        pattern.count += 1;
        pattern
            .character_pairs
            .push([characters.0.to_string(), characters.1.to_string()]);
        pattern.stories.push(story.to_string());

        *self
            .data
            .user_preferences
            .favorite_relationships
            .entry(kind.to_string())
            .or_insert(0) += 1;

        self.persist()?;
        debug!("Tracked relationship pattern - {}", kind);
        Ok(())
    }

    /// A writing session finished with `length` words.
    pub fn record_writing_session(&mut self, length: u64, category: Option<&str>) -> Result<()> {
        let hour = self.clock.now().hour();
        self.data.writing_habits.story_lengths.push(length);
        self.data.writing_habits.writing_times.push(hour);

        self.persist()?;
        debug!(
            "Tracked writing session - {} words (prompt: {})",
            length,
            category.unwrap_or("none")
        );
        Ok(())
    }

    /// An extraction run accepted `successful` of `found` characters.
    pub fn record_extraction(&mut self, successful: u32, found: u32) -> Result<()> {
        let timestamp = self.now_utc();
        let cap = self.config.history_cap;
        let log = &mut self.data.character_extractions;

        log.total_extractions += 1;
        log.successful_extractions += u64::from(successful);
        log.extraction_history.push(ExtractionRecord {
            timestamp,
            successful_count: successful,
            total_found: found,
            success_rate: if found > 0 {
                f64::from(successful) / f64::from(found)
            } else {
                0.0
            },
        });
        evict_oldest(&mut log.extraction_history, cap);

        self.persist()?;
        debug!(
            "Tracked character extraction - {} successful out of {} found",
            successful, found
        );
        Ok(())
    }

    /// A character was discovered by extraction.
    pub fn record_discovered_character(
        &mut self,
        name: &str,
        source_story: &str,
        confidence: f32,
    ) -> Result<()> {
        let discovered_at = self.now_utc();
        let cap = self.config.discovered_cap;
        let found = &mut self.data.character_extractions.characters_found;

        found.push(DiscoveredCharacter {
            name: name.to_string(),
            source_story: source_story.to_string(),
            confidence,
            discovered_at,
        });
        evict_oldest(found, cap);

        self.persist()?;
        debug!("Tracked discovered character - {}", name);
        Ok(())
    }

    // -- Queries ----------------------------------------------------------

    pub fn most_used_prompt_types(&self) -> Vec<PromptTypeUsage> {
        self.data.most_used_prompt_types(self.config.top_n)
    }

    pub fn favorite_characters(&self) -> Vec<FavoriteCharacter> {
        self.data.favorite_characters(self.config.top_n)
    }

    pub fn common_relationship_patterns(&self) -> Vec<RelationshipPatternSummary> {
        self.data.common_relationship_patterns(self.config.top_n)
    }

    pub fn writing_habits(&self) -> WritingHabits {
        self.data.writing_habits()
    }

    pub fn theme_preferences(&self) -> Vec<ThemePreference> {
        self.data.theme_preferences(self.config.top_n)
    }

    pub fn extraction_stats(&self) -> ExtractionStats {
        self.data.extraction_stats(self.config.recent_window)
    }

    pub fn writing_progress(&self) -> Vec<DailyCount> {
        self.data.writing_progress(self.config.progress_days)
    }

    pub fn discovery_timeline(&self) -> Vec<DailyCount> {
        self.data.discovery_timeline()
    }

    /// All insight queries in one report.
    pub fn pattern_insights(&self) -> PatternInsights {
        PatternInsights {
            most_used_prompt_types: self.most_used_prompt_types(),
            favorite_characters: self.favorite_characters(),
            common_relationship_patterns: self.common_relationship_patterns(),
            writing_habits: self.writing_habits(),
            theme_preferences: self.theme_preferences(),
            extraction_stats: self.extraction_stats(),
        }
    }

    // -- Maintenance ------------------------------------------------------

    /// Reset every section and persist the empty document.
    pub fn clear(&mut self) -> Result<()> {
        self.data = LearningData::default();
        self.persist()?;
        info!("Cleared all learning data");
        Ok(())
    }

    /// Pretty-printed snapshot for backup.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    /// Write a dated backup into `dir` and return its path.
    pub fn export_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir
            .as_ref()
            .join(export_file_name(self.now_utc().date_naive()));
        std::fs::write(&path, self.export_json()?)?;
        info!("Exported learning data to {}", path.display());
        Ok(path)
    }

    /// Replace the document with a previously exported snapshot.
    ///
    /// Returns `false` and leaves both memory and store untouched when the
    /// snapshot is not a JSON object of the expected shape or cannot be
    /// stored.
    pub fn import_json(&mut self, text: &str) -> bool {
        match self.try_import(text) {
            Ok(()) => {
                info!("Successfully imported learning data");
                true
            }
            Err(e) => {
                warn!("Error importing learning data: {}", e);
                false
            }
        }
    }

    fn try_import(&mut self, text: &str) -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(WeaverError::store(
                LEARNING_DATA_KEY,
                "backup must be a JSON object",
            ));
        }

        let data: LearningData = serde_json::from_value(value)?;
        let serialized = serde_json::to_string(&data)?;
        self.store.put(LEARNING_DATA_KEY, &serialized)?;
        self.data = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{Duration, Local, TimeZone};

    fn clock() -> FixedClock {
        FixedClock::new(Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    fn stored(tracker: &LearningTracker<MemoryStore, &FixedClock>) -> serde_json::Value {
        let text = tracker.store().get(LEARNING_DATA_KEY).unwrap().unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_open_creates_document() {
        let clock = clock();
        let tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();
        assert!(tracker.data().is_empty());
        assert_eq!(stored(&tracker)["promptUsage"], serde_json::json!({}));
    }

    #[test]
    fn test_open_recovers_malformed_document() {
        let mut store = MemoryStore::new();
        store.put(LEARNING_DATA_KEY, "{broken").unwrap();

        let tracker = LearningTracker::open(store, TrackerConfig::default()).unwrap();
        assert!(tracker.data().is_empty());
        let text = tracker.store().get(LEARNING_DATA_KEY).unwrap().unwrap();
        assert!(serde_json::from_str::<LearningData>(&text).is_ok());
    }

    #[test]
    fn test_open_keeps_existing_document() {
        let mut store = MemoryStore::new();
        store
            .put(LEARNING_DATA_KEY, r#"{"userPreferences":{"ignoredPrompts":{"thematic":4}}}"#)
            .unwrap();

        let tracker = LearningTracker::open(store, TrackerConfig::default()).unwrap();
        assert_eq!(tracker.data().user_preferences.ignored_prompts["thematic"], 4);
    }

    #[test]
    fn test_record_prompt_used_persists() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        tracker.record_prompt_used("Write about loss", "romantic_relationship").unwrap();
        clock.advance(Duration::minutes(5));
        tracker.record_prompt_used("Write again", "romantic_relationship").unwrap();

        let json = stored(&tracker);
        let usage = &json["promptUsage"]["romantic_relationship"];
        assert_eq!(usage["count"], 2);
        assert_eq!(usage["examples"][1]["text"], "Write again");
        assert_eq!(usage["examples"][1]["used"], true);
        assert_eq!(json["writingHabits"]["usedPrompts"][0]["type"], "romantic_relationship");
        assert_eq!(json["userPreferences"]["favoriteThemes"]["Love & Relationships"], 2);

        let top = tracker.most_used_prompt_types();
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].last_used, Some(clock.now().with_timezone(&Utc)));
    }

    #[test]
    fn test_prompt_examples_capped() {
        let clock = clock();
        let config = TrackerConfig {
            example_cap: 3,
            ..TrackerConfig::default()
        };
        let mut tracker = LearningTracker::with_clock(MemoryStore::new(), config, &clock).unwrap();

        for i in 0..5 {
            tracker.record_prompt_used(&format!("prompt {i}"), "thematic").unwrap();
        }

        let usage = &tracker.data().prompt_usage["thematic"];
        assert_eq!(usage.count, 5);
        let texts: Vec<_> = usage.examples.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["prompt 2", "prompt 3", "prompt 4"]);
        assert_eq!(tracker.data().writing_habits.used_prompts.len(), 5);
    }

    #[test]
    fn test_record_character_and_relationship() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        tracker.record_character_usage("Mira", "Mentor", "Harbor").unwrap();
        tracker.record_character_usage("Mira", "Villain", "Lighthouse").unwrap();
        tracker.record_relationship_pattern("rivalry", ("Mira", "Tom"), "Harbor").unwrap();
        tracker.record_relationship_pattern("rivalry", ("Mira", "Tom"), "Docks").unwrap();
        tracker.record_prompt_ignored("thematic").unwrap();

        let mira = &tracker.data().character_usage["Mira"];
        assert_eq!(mira.usage_count, 2);
        assert_eq!(mira.role, "Mentor");
        assert_eq!(mira.stories, vec!["Harbor", "Lighthouse"]);

        let patterns = tracker.common_relationship_patterns();
        assert_eq!(patterns[0].frequency, 2);
        assert_eq!(patterns[0].unique_pairs, 1);

        let json = stored(&tracker);
        assert_eq!(json["userPreferences"]["favoriteRelationships"]["rivalry"], 2);
        assert_eq!(json["userPreferences"]["ignoredPrompts"]["thematic"], 1);
    }

    #[test]
    fn test_record_writing_session_hours() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        tracker.record_writing_session(300, Some("thematic")).unwrap();
        clock.advance(Duration::hours(13));
        tracker.record_writing_session(500, None).unwrap();
        tracker.record_writing_session(100, None).unwrap();

        assert_eq!(tracker.data().writing_habits.writing_times, vec![9, 22, 22]);
        let habits = tracker.writing_habits();
        assert_eq!(habits.average_story_length, 300);
        assert_eq!(habits.preferred_writing_time, "Late Night (9 PM-4 AM)");
    }

    #[test]
    fn test_extraction_history_fifo_cap() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        for i in 0..55u32 {
            tracker.record_extraction(i, 60).unwrap();
        }

        let log = &tracker.data().character_extractions;
        assert_eq!(log.total_extractions, 55);
        assert_eq!(log.extraction_history.len(), 50);
        assert_eq!(log.extraction_history[0].successful_count, 5);
        assert_eq!(log.extraction_history[49].successful_count, 54);
        assert_eq!(stored(&tracker)["characterExtractions"]["extractionHistory"].as_array().unwrap().len(), 50);
    }

    #[test]
    fn test_discovered_characters_fifo_cap() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        for i in 0..105 {
            tracker
                .record_discovered_character(&format!("Name{i}"), "Harbor", 0.5)
                .unwrap();
        }

        let found = &tracker.data().character_extractions.characters_found;
        assert_eq!(found.len(), 100);
        assert_eq!(found[0].name, "Name5");
        assert_eq!(found[99].name, "Name104");
        assert_eq!(tracker.extraction_stats().total_characters_discovered, 100);
        assert_eq!(tracker.discovery_timeline()[0].count, 100);
    }

    #[test]
    fn test_extraction_success_rate() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        tracker.record_extraction(3, 4).unwrap();
        tracker.record_extraction(0, 0).unwrap();

        let stats = tracker.extraction_stats();
        assert_eq!(stats.successful_extractions, 3);
        // (0.75 + 0.0) / 2
        assert_eq!(stats.average_success_rate, 38);
    }

    #[test]
    fn test_clear_resets_and_persists() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();
        tracker.record_prompt_used("Write", "thematic").unwrap();
        tracker.record_extraction(1, 1).unwrap();

        tracker.clear().unwrap();
        assert_eq!(tracker.data(), &LearningData::default());
        let back: LearningData = serde_json::from_value(stored(&tracker)).unwrap();
        assert_eq!(back, LearningData::default());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let clock = clock();
        let mut source =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();
        source.record_prompt_used("Write", "identity").unwrap();
        source.record_discovered_character("Mira", "Harbor", 0.87).unwrap();
        source.record_extraction(2, 3).unwrap();
        let snapshot = source.export_json().unwrap();

        let mut target =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();
        assert!(target.import_json(&snapshot));
        assert_eq!(target.data(), source.data());

        let stored_back: LearningData = serde_json::from_value(stored(&target)).unwrap();
        assert_eq!(&stored_back, source.data());
    }

    #[test]
    fn test_invalid_import_leaves_document() {
        let clock = clock();
        let mut tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();
        tracker.record_prompt_ignored("thematic").unwrap();
        let before = tracker.data().clone();
        let stored_before = stored(&tracker);

        assert!(!tracker.import_json("not json"));
        assert!(!tracker.import_json("[1, 2, 3]"));
        assert!(!tracker.import_json(r#"{"promptUsage": 7}"#));

        assert_eq!(tracker.data(), &before);
        assert_eq!(stored(&tracker), stored_before);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "ml_learning_data_2024-03-09.json");
    }

    #[test]
    fn test_export_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let clock = clock();
        let tracker =
            LearningTracker::with_clock(MemoryStore::new(), TrackerConfig::default(), &clock).unwrap();

        let path = tracker.export_to_dir(dir.path()).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("ml_learning_data_"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(serde_json::from_str::<LearningData>(&text).unwrap(), LearningData::default());
    }
}
