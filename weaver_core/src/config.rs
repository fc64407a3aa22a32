//! Engine configuration.
//!
//! Every field has a default matching the tuned constants of the extractor and
//! tracker, so a config file only needs the values it overrides:
//!
//! ```toml
//! [extraction]
//! max_characters = 5
//!
//! [tracker]
//! history_cap = 20
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Tunables for character extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of characters returned per text.
    pub max_characters: usize,

    /// Characters must score strictly above this to be returned.
    pub min_confidence: f32,

    /// Upper bound on any merged confidence.
    pub max_confidence: f32,

    /// Confidence added per whole-word mention when merging candidates.
    pub mention_boost: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_characters: 10,
            min_confidence: 0.2,
            max_confidence: 0.95,
            mention_boost: 0.05,
        }
    }
}

/// Tunables for the learning tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Extraction history entries kept (oldest evicted first).
    pub history_cap: usize,

    /// Discovered-character entries kept (oldest evicted first).
    pub discovered_cap: usize,

    /// Example prompts kept per prompt category.
    pub example_cap: usize,

    /// Extraction events averaged for the success rate.
    pub recent_window: usize,

    /// Entries returned by ranked queries.
    pub top_n: usize,

    /// Days returned by the writing progress query.
    pub progress_days: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_cap: 50,
            discovered_cap: 100,
            example_cap: 20,
            recent_window: 10,
            top_n: 5,
            progress_days: 30,
        }
    }
}

/// Top-level configuration for the core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub extraction: ExtractionConfig,
    pub tracker: TrackerConfig,
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.extraction.max_characters, 10);
        assert_eq!(config.tracker.history_cap, 50);
        assert_eq!(config.tracker.discovered_cap, 100);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [extraction]
            max_characters = 5

            [tracker]
            history_cap = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.max_characters, 5);
        assert_eq!(config.extraction.min_confidence, 0.2);
        assert_eq!(config.tracker.history_cap, 20);
        assert_eq!(config.tracker.discovered_cap, 100);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml_str("[extraction]\nmax_characters = \"ten\"").unwrap_err();
        assert!(matches!(err, crate::error::WeaverError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/weaver.toml").unwrap_err();
        assert!(matches!(err, crate::error::WeaverError::Io(_)));
    }
}
