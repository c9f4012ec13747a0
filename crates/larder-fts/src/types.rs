//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. Indexer and searcher over the same data directory must use
//! the same analyzer settings (`stopwords_enabled`, `custom_stopwords`,
//! `allowlist`).
//!
//! ```toml
//! diets = ["keto", "vegan"]
//! stopwords_enabled = true
//!
//! [similarity]
//! max_doc_frequency_pct = 40
//! ```

use std::path::Path;

use larder_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Diets known to the engine unless configured otherwise.
pub const DEFAULT_DIETS: [&str; 5] = ["keto", "paleo", "lowcarb", "glutenfree", "vegan"];

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Index writer memory budget in bytes.
    #[serde(default = "default_writer_buffer_bytes")]
    pub writer_buffer_bytes: usize,

    /// Diet names that get a filter field and a facet dimension.
    #[serde(default = "default_diets")]
    pub diets: Vec<String>,

    /// Enable stopword removal in the analyzer.
    #[serde(default = "default_true")]
    pub stopwords_enabled: bool,

    /// Custom stopwords to add.
    #[serde(default)]
    pub custom_stopwords: Vec<String>,

    /// Words to preserve (not filter as stopwords).
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// "More like this" tuning.
    #[serde(default)]
    pub similarity: SimilarityConfig,
}

/// Term selection parameters for similarity search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Ignore terms present in more than this percentage of documents.
    #[serde(default = "default_max_doc_frequency_pct")]
    pub max_doc_frequency_pct: u64,

    /// Ignore terms present in fewer documents than this.
    #[serde(default = "default_one")]
    pub min_doc_frequency: u64,

    /// Ignore terms occurring fewer times than this in the source text.
    #[serde(default = "default_one_usize")]
    pub min_term_frequency: usize,

    /// Maximum number of terms in the generated query.
    #[serde(default = "default_max_query_terms")]
    pub max_query_terms: usize,
}

fn default_writer_buffer_bytes() -> usize {
    50_000_000
}

fn default_diets() -> Vec<String> {
    DEFAULT_DIETS.iter().map(|d| d.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_max_doc_frequency_pct() -> u64 {
    50
}

fn default_one() -> u64 {
    1
}

fn default_one_usize() -> usize {
    1
}

fn default_max_query_terms() -> usize {
    25
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            writer_buffer_bytes: default_writer_buffer_bytes(),
            diets: default_diets(),
            stopwords_enabled: default_true(),
            custom_stopwords: Vec::new(),
            allowlist: Vec::new(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            max_doc_frequency_pct: default_max_doc_frequency_pct(),
            min_doc_frequency: default_one(),
            min_term_frequency: default_one_usize(),
            max_query_terms: default_max_query_terms(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Invalid engine configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        for diet in &self.diets {
            if diet.is_empty() || !diet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(Error::config(format!(
                    "diet name `{diet}` must be non-empty ASCII alphanumeric"
                )));
            }
        }
        if self.similarity.max_doc_frequency_pct == 0 || self.similarity.max_doc_frequency_pct > 100
        {
            return Err(Error::config(
                "similarity.max_doc_frequency_pct must be in [1, 100]",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
