//! Index metadata.
//!
//! `IndexMetadata` records what an index was built with, so that a searcher
//! opened later over the same data directory can check compatibility before
//! running queries. It is rewritten on every commit.
//!
//! # Usage
//!
//! ```rust,ignore
//! use larder_fts::IndexMetadata;
//!
//! if let Some(metadata) = IndexMetadata::load(&data_dir)? {
//!     metadata.check_schema_version()?;
//!     println!("{} recipes", metadata.document_count);
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use larder_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::extractor::DimensionConfig;
use crate::schema::SCHEMA_VERSION;

/// Metadata filename stored in the data directory.
const METADATA_FILE: &str = "larder-metadata.json";

/// Metadata about an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Schema version used for this index.
    pub schema_version: u32,

    /// Diets with a filter field.
    pub diets: Vec<String>,

    /// Category dimensions populated by the indexer.
    pub dimensions: Vec<DimensionConfig>,

    /// Number of documents after the last commit.
    pub document_count: u64,

    /// Timestamp of the last commit (RFC 3339).
    pub committed_at: String,
}

impl IndexMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(diets: Vec<String>, dimensions: Vec<DimensionConfig>, document_count: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            diets,
            dimensions,
            document_count,
            committed_at: Utc::now().to_rfc3339(),
        }
    }

    /// Load metadata from the data directory.
    ///
    /// Returns `Ok(None)` if the metadata file doesn't exist.
    /// Returns `Err` if the file exists but cannot be parsed.
    pub fn load(data_dir: &Path) -> Result<Option<Self>> {
        let path = data_dir.join(METADATA_FILE);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;

        let metadata: Self = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid metadata JSON: {e}")))?;

        Ok(Some(metadata))
    }

    /// Save metadata to the data directory.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(METADATA_FILE);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::operation(format!("Failed to serialize metadata: {e}")))?;

        std::fs::write(&path, content).map_err(|e| Error::io_with_path(e, &path))?;

        Ok(())
    }

    /// Fail if the index was written with a different schema version.
    pub fn check_schema_version(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(Error::config(format!(
                "Index schema version {} does not match {SCHEMA_VERSION}; rebuild the index",
                self.schema_version
            )));
        }
        Ok(())
    }

    /// Get the commit timestamp as a DateTime.
    pub fn committed_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.committed_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ============================================================================
// Tests
// ============================================================================
