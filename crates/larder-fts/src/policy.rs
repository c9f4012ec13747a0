//! Pluggable search policies.
//!
//! A [`SearchPolicy`] sees every parsed full-text query and every similarity
//! lookup before it runs, and decides whether facets are worth computing for
//! a given hit count. It is the engine's backpressure hook: facet counting
//! walks every matching document, so a policy can skip it for broad queries.

use larder_core::{Error, Result};

use crate::fulltext::FulltextQuery;
use crate::similarity::SimilaritySource;

/// Hooks consulted by the query pipeline.
pub trait SearchPolicy: Send + Sync {
    /// Inspect a parsed full-text query; an error rejects the whole search.
    fn inspect_parsed_fulltext_query(&self, query: &FulltextQuery) -> Result<()>;

    /// Whether to compute facets for a search with `total_hits` matches.
    fn should_compute_facets(&self, total_hits: u64) -> bool;

    /// Inspect a similarity lookup before its query runs; an error rejects
    /// the lookup. Accepts everything unless overridden.
    fn inspect_similarity_query(&self, _source: &SimilaritySource<'_>) -> Result<()> {
        Ok(())
    }
}

/// Accepts every query and always computes facets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissivePolicy;

impl SearchPolicy for PermissivePolicy {
    fn inspect_parsed_fulltext_query(&self, _query: &FulltextQuery) -> Result<()> {
        Ok(())
    }

    fn should_compute_facets(&self, _total_hits: u64) -> bool {
        true
    }
}

/// Rejects match-all full-text queries and skips facets on large result sets.
#[derive(Debug, Clone, Copy)]
pub struct NoMatchAllPolicy {
    facet_hit_limit: u64,
}

impl NoMatchAllPolicy {
    /// Facets are computed only when a search matches at most
    /// `facet_hit_limit` documents.
    pub fn new(facet_hit_limit: u64) -> Self {
        Self { facet_hit_limit }
    }
}

impl Default for NoMatchAllPolicy {
    fn default() -> Self {
        Self::new(u64::MAX)
    }
}

impl SearchPolicy for NoMatchAllPolicy {
    fn inspect_parsed_fulltext_query(&self, query: &FulltextQuery) -> Result<()> {
        if query.is_match_all() {
            return Err(Error::rejected("match-all full-text queries are not allowed"));
        }
        Ok(())
    }

    fn should_compute_facets(&self, total_hits: u64) -> bool {
        total_hits <= self.facet_hit_limit
    }
}

// ============================================================================
// Tests
// ============================================================================
