//! Fusion of strategy candidates into a ranked roster.

use std::collections::HashMap;
use tracing::debug;
use weaver_model::{name_key, Character, CharacterId};

use super::strategies::Candidate;
use super::tokenizer::count_mentions;
use crate::config::ExtractionConfig;
use crate::inference::infer_role;

/// Merges candidates by normalized name.
///
/// Records stay in first-detection order so that ranking ties resolve the
/// same way on every run.
pub struct CandidateAggregator<'a> {
    config: &'a ExtractionConfig,
    text: &'a str,
    source_story: Option<&'a str>,
    records: Vec<Character>,
    index: HashMap<String, usize>,
}

impl<'a> CandidateAggregator<'a> {
    pub fn new(config: &'a ExtractionConfig, text: &'a str, source_story: Option<&'a str>) -> Self {
        Self {
            config,
            text,
            source_story,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Fold one candidate into the roster.
    ///
    /// Mentions are recounted on the full text and boost the strategy
    /// confidence. The count is case-insensitive, so it is taken once per
    /// normalized name and shared by every later candidate with that name. An
    /// existing record keeps the higher confidence.
    pub fn add(&mut self, candidate: Candidate) {
        let key = name_key(&candidate.name);
        if key.is_empty() {
            return;
        }

        if let Some(&slot) = self.index.get(&key) {
            let existing = &mut self.records[slot];
            let confidence = (candidate.confidence
                + self.config.mention_boost * existing.mention_count as f32)
                .min(self.config.max_confidence);
            if confidence > existing.confidence {
                existing.confidence = confidence;
                existing.method = Some(candidate.method);
            }
            return;
        }

        let mentions = count_mentions(self.text, &candidate.name);
        let confidence = (candidate.confidence + self.config.mention_boost * mentions as f32)
            .min(self.config.max_confidence);

        let mut character = Character::new(candidate.name.trim());
        character.id = CharacterId::from_name(&candidate.name);
        character.mention_count = mentions;
        character.confidence = confidence;
        character.method = Some(candidate.method);
        character.role = infer_role(&candidate.name, self.text).map(|role| role.label().to_string());
        character.source_story = self.source_story.map(str::to_string);

        debug!(
            "New candidate '{}' via {} ({:.2})",
            character.name, candidate.method, confidence
        );

        self.index.insert(key, self.records.len());
        self.records.push(character);
    }

    /// Fold every candidate, in order.
    pub fn extend(&mut self, candidates: impl IntoIterator<Item = Candidate>) {
        for candidate in candidates {
            self.add(candidate);
        }
    }

    /// Number of distinct names seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Filter, rank and cap the merged records.
    pub fn into_roster(self) -> Vec<Character> {
        let min_confidence = self.config.min_confidence;
        let mut roster: Vec<Character> = self
            .records
            .into_iter()
            .filter(|c| c.confidence > min_confidence && c.mention_count >= 1)
            .collect();

        // sort_by is stable: equal scores keep detection order
        roster.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        roster.truncate(self.config.max_characters);
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_model::DetectionMethod;

    fn candidate(name: &str, confidence: f32, method: DetectionMethod) -> Candidate {
        Candidate {
            name: name.to_string(),
            confidence,
            mention_count: 1,
            method,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn test_mention_boost_and_cap() {
        let config = ExtractionConfig::default();
        let text = "Ilsa sang. Ilsa danced. Ilsa slept.";
        let mut aggregator = CandidateAggregator::new(&config, text, None);
        aggregator.add(candidate("Ilsa", 0.6, DetectionMethod::RepeatedProperNoun));
        aggregator.add(candidate("Mara", 0.9, DetectionMethod::DialogueAttribution));

        let roster = aggregator.into_roster();
        // Mara never appears in the text, so she is filtered out
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].mention_count, 3);
        assert!(approx(roster[0].confidence, 0.75));
    }

    #[test]
    fn test_merge_keeps_max_confidence_and_recount() {
        let config = ExtractionConfig::default();
        let text = "Oskar waited. Later oskar left.";
        let mut aggregator = CandidateAggregator::new(&config, text, Some("Docks"));
        aggregator.add(candidate("Oskar", 0.8, DetectionMethod::DialogueAttribution));
        aggregator.add(candidate("oskar", 0.5, DetectionMethod::CapitalizedSequence));
        assert_eq!(aggregator.len(), 1);

        let roster = aggregator.into_roster();
        let oskar = &roster[0];
        assert_eq!(oskar.name, "Oskar");
        assert_eq!(oskar.mention_count, 2);
        assert!(approx(oskar.confidence, 0.9));
        assert_eq!(oskar.method, Some(DetectionMethod::DialogueAttribution));
        assert_eq!(oskar.source_story.as_deref(), Some("Docks"));
        assert_eq!(oskar.id, CharacterId::from_name("Oskar"));
    }

    #[test]
    fn test_method_follows_highest_confidence() {
        let config = ExtractionConfig::default();
        let text = "Vera ran.";
        let mut aggregator = CandidateAggregator::new(&config, text, None);
        aggregator.add(candidate("Vera", 0.5, DetectionMethod::CapitalizedSequence));
        aggregator.add(candidate("Vera", 0.7, DetectionMethod::SentenceSubject));
        aggregator.add(candidate("Vera", 0.7, DetectionMethod::RepeatedProperNoun));

        let roster = aggregator.into_roster();
        assert_eq!(roster[0].method, Some(DetectionMethod::SentenceSubject));
    }

    #[test]
    fn test_low_confidence_filtered() {
        let config = ExtractionConfig::default();
        let text = "Al waved.";
        let mut aggregator = CandidateAggregator::new(&config, text, None);
        aggregator.add(candidate("Al", 0.1, DetectionMethod::CapitalizedSequence));

        // 0.1 + 0.05 is not above 0.2
        assert!(aggregator.into_roster().is_empty());
    }

    #[test]
    fn test_roster_sorted_and_truncated() {
        let config = ExtractionConfig {
            max_characters: 2,
            ..ExtractionConfig::default()
        };
        let text = "Ada Bo Cy";
        let mut aggregator = CandidateAggregator::new(&config, text, None);
        aggregator.add(candidate("Ada", 0.4, DetectionMethod::CapitalizedSequence));
        aggregator.add(candidate("Bo", 0.6, DetectionMethod::CapitalizedSequence));
        aggregator.add(candidate("Cy", 0.6, DetectionMethod::CapitalizedSequence));

        let roster = aggregator.into_roster();
        let names: Vec<_> = roster.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Cy"]);
    }

    #[test]
    fn test_role_inferred_on_creation() {
        let config = ExtractionConfig::default();
        let text = "Morgana was the villain.";
        let mut aggregator = CandidateAggregator::new(&config, text, None);
        aggregator.add(candidate("Morgana", 0.5, DetectionMethod::CapitalizedSequence));

        let roster = aggregator.into_roster();
        assert_eq!(roster[0].role.as_deref(), Some("Antagonist"));
    }
}
