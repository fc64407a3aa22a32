//! Character extraction from prose.
//!
//! Extraction runs in three stages:
//! - **tokenizer**: sentence/word splitting and capitalization lexicons
//! - **strategies**: four independent detectors proposing candidates
//! - **aggregator**: merges candidates by normalized name, boosts by mention
//!   count, then filters and ranks

mod aggregator;
mod strategies;
mod tokenizer;

pub use aggregator::*;
pub use strategies::*;
pub use tokenizer::*;

use tracing::{debug, info};
use weaver_model::Character;

use crate::config::ExtractionConfig;

/// Heuristic character extractor.
///
/// Extraction is pure: the same text and config always give the same roster,
/// including the character ids.
#[derive(Debug, Clone, Default)]
pub struct CharacterExtractor {
    config: ExtractionConfig,
}

impl CharacterExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Find probable characters in `text`, best first.
    pub fn extract(&self, text: &str, source_story: Option<&str>) -> Vec<Character> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        debug!("Extracting characters from {} bytes of text", text.len());

        let mut aggregator = CandidateAggregator::new(&self.config, text, source_story);
        aggregator.extend(all_candidates(text));
        let distinct = aggregator.len();
        let roster = aggregator.into_roster();

        info!(
            "Extracted {} characters ({} distinct candidates)",
            roster.len(),
            distinct
        );
        roster
    }
}
