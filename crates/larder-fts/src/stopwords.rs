//! Stopword list for the recipe analyzer.
//!
//! The list starts from the `stop-words` crate's English list, adds
//! `custom_stopwords` and removes `allowlist` entries. It runs after
//! lowercasing, so every comparison here is case-insensitive.
//!
//! Words that must stay searchable go in `EngineConfig::allowlist`.
//!
//! # Example
//!
//! ```rust
//! use larder_fts::stopwords::StopwordList;
//! use larder_fts::EngineConfig;
//!
//! let list = StopwordList::new(&EngineConfig::default());
//! assert!(list.is_stopword("The"));
//! assert!(!list.is_stopword("garlic"));
//! ```

use std::collections::BTreeSet;

use stop_words::{Language, get};

use crate::types::EngineConfig;

/// Stopwords removed by the analyzer.
pub struct StopwordList {
    stopwords: BTreeSet<String>,
    enabled: bool,
}

impl StopwordList {
    /// Build the list from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        if !config.stopwords_enabled {
            return Self::disabled();
        }

        let mut stopwords: BTreeSet<String> = get(Language::English)
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        for word in &config.custom_stopwords {
            stopwords.insert(word.to_lowercase());
        }
        for word in &config.allowlist {
            stopwords.remove(&word.to_lowercase());
        }

        Self {
            stopwords,
            enabled: true,
        }
    }

    /// An empty list; nothing is removed.
    pub fn disabled() -> Self {
        Self {
            stopwords: BTreeSet::new(),
            enabled: false,
        }
    }

    /// Check if a word is a stopword (case-insensitive).
    pub fn is_stopword(&self, word: &str) -> bool {
        self.enabled && self.stopwords.contains(&word.to_lowercase())
    }

    /// The words, lowercased, for tantivy's `StopWordFilter`.
    pub fn words(&self) -> Vec<String> {
        self.stopwords.iter().cloned().collect()
    }

    /// Get the number of stopwords in the list.
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Whether the list removes nothing.
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    /// Check if removal is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl std::fmt::Debug for StopwordList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopwordList")
            .field("enabled", &self.enabled)
            .field("stopword_count", &self.stopwords.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
