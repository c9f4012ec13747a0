//! Batch indexing orchestration.
//!
//! `IndexBuilder` feeds a JSON-lines recipe corpus (one JSON recipe per
//! line) into an [`Indexer`], committing in batches. Lines that fail to
//! parse or validate are logged and counted; they never stop the build.
//!
//! # Usage
//!
//! ```rust,ignore
//! use larder_fts::{IndexBuilder, Indexer};
//!
//! let mut indexer = Indexer::open(&data_dir, &config, extractors)?;
//! let stats = IndexBuilder::new()
//!     .with_batch_size(1_000)
//!     .merge_after_build(true)
//!     .build(&corpus_path, &mut indexer)
//!     .await?;
//! println!("Indexed {} recipes", stats.recipes_indexed);
//! ```

use std::path::Path;

use larder_core::{Error, Recipe, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::indexer::Indexer;

/// Default number of recipes per commit.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Statistics about an indexing operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of non-blank lines read.
    pub lines_read: usize,
    /// Number of recipes successfully indexed.
    pub recipes_indexed: usize,
    /// Number of lines skipped (malformed JSON or invalid recipe).
    pub lines_skipped: usize,
    /// Number of recipes the indexer refused.
    pub errors: usize,
    /// Total bytes of input processed.
    pub bytes_processed: usize,
    /// Number of commits issued.
    pub commits: usize,
}

/// Batch index builder.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    batch_size: usize,
    merge_after_build: bool,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    /// Create a builder committing every 100 recipes.
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            merge_after_build: false,
        }
    }

    /// Set the batch size for commits.
    ///
    /// Recipes are committed in batches to balance memory usage and I/O.
    /// A size of 0 is treated as 1.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Merge all segments once the corpus is indexed.
    pub fn merge_after_build(mut self, merge: bool) -> Self {
        self.merge_after_build = merge;
        self
    }

    /// Index every recipe of a JSON-lines file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file doesn't exist
    /// - Reading the file fails
    /// - A commit or the final merge fails
    pub async fn build(&self, input: &Path, indexer: &mut Indexer) -> Result<IndexStats> {
        // Validate input path
        if !input.is_file() {
            return Err(Error::not_found(format!(
                "recipe corpus {}",
                input.display()
            )));
        }

        log::info!("Building index from {}", input.display());

        let file = tokio::fs::File::open(input)
            .await
            .map_err(|e| Error::io_with_path(e, input))?;
        let mut lines = BufReader::new(file).lines();

        let mut stats = IndexStats::default();
        let mut batch_count = 0;
        let mut line_number = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| Error::io_with_path(e, input))?
        {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            stats.lines_read += 1;
            stats.bytes_processed += line.len();

            // Parse recipe
            let recipe = match Recipe::from_json(line) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Skipped line {line_number}: {e}");
                    stats.lines_skipped += 1;
                    continue;
                }
            };

            // Add to index
            if let Err(e) = indexer.add_recipe(&recipe) {
                log::warn!("Failed to index recipe {}: {e}", recipe.recipe_id());
                stats.errors += 1;
                continue;
            }

            stats.recipes_indexed += 1;
            batch_count += 1;

            // Commit batch
            if batch_count >= self.batch_size {
                indexer.commit()?;
                stats.commits += 1;
                batch_count = 0;
            }
        }

        // Final commit
        if batch_count > 0 {
            indexer.commit()?;
            stats.commits += 1;
        }

        if self.merge_after_build {
            indexer.merge_segments()?;
        }

        log::info!(
            "Indexed {} recipes ({} bytes, {} skipped, {} errors)",
            stats.recipes_indexed,
            stats.bytes_processed,
            stats.lines_skipped,
            stats.errors
        );

        Ok(stats)
    }
}

// ============================================================================
// Tests
// ============================================================================
