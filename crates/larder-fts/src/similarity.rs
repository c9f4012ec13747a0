//! "More like this" lookups.
//!
//! Both entry points build a Tantivy `MoreLikeThisQuery` over the full-text
//! field only. Terms present in more than `max_doc_frequency_pct` percent of
//! the documents are never selected. The search policy sees every lookup
//! before its query runs.

use std::sync::Arc;

use larder_core::{Error, Result, SearchResult};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::MoreLikeThisQuery;
use tantivy::schema::{OwnedValue, Value};
use tantivy::TantivyDocument;

use crate::policy::SearchPolicy;
use crate::schema::RecipeSchema;
use crate::snapshot::IndexSnapshot;
use crate::types::SimilarityConfig;

/// What a similarity lookup is seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilaritySource<'a> {
    /// Free text.
    Text(&'a str),
    /// An indexed recipe.
    Recipe(u64),
}

/// Builds and runs similarity queries.
#[derive(Clone)]
pub struct SimilarityEngine {
    schema: RecipeSchema,
    config: SimilarityConfig,
    policy: Arc<dyn SearchPolicy>,
}

impl SimilarityEngine {
    /// Create an engine.
    pub fn new(
        schema: RecipeSchema,
        config: SimilarityConfig,
        policy: Arc<dyn SearchPolicy>,
    ) -> Self {
        Self {
            schema,
            config,
            policy,
        }
    }

    /// Recipes similar to free text.
    ///
    /// `total_hits` is the engine's match count for the generated query.
    pub fn find_similar_text(
        &self,
        snapshot: &IndexSnapshot,
        text: &str,
        max_results: usize,
    ) -> Result<SearchResult> {
        check_max_results(max_results)?;

        let query = self.query(
            snapshot,
            SimilaritySource::Text(text),
            vec![OwnedValue::Str(text.to_string())],
        )?;
        let limit = snapshot.hit_limit(max_results);
        let collector = (Count, TopDocs::with_limit(limit).order_by_score());
        let (total, top) = snapshot
            .searcher()
            .search(&query, &collector)
            .map_err(|e| Error::operation(format!("Similarity search failed: {e}")))?;

        let ids = top
            .into_iter()
            .map(|(_, addr)| snapshot.recipe_id(addr))
            .collect::<Result<Vec<_>>>()?;

        SearchResult::new(total as u64, ids, Default::default())
    }

    /// Recipes similar to an indexed recipe, excluding that recipe.
    ///
    /// An unknown id yields an empty result. `total_hits` is the number of
    /// ids returned.
    pub fn find_similar_recipe(
        &self,
        snapshot: &IndexSnapshot,
        recipe_id: u64,
        max_results: usize,
    ) -> Result<SearchResult> {
        check_max_results(max_results)?;

        let Some(addr) = snapshot.find_doc(recipe_id)? else {
            log::debug!("Similarity source {recipe_id} not in index");
            return Ok(SearchResult::empty());
        };

        let source: TantivyDocument = snapshot
            .searcher()
            .doc(addr)
            .map_err(|e| Error::operation(format!("Failed to load recipe {recipe_id}: {e}")))?;
        let values: Vec<OwnedValue> = source
            .get_all(self.schema.fulltext)
            .filter_map(|v| v.as_str())
            .map(|s| OwnedValue::Str(s.to_string()))
            .collect();

        let query = self.query(snapshot, SimilaritySource::Recipe(recipe_id), values)?;
        // One extra hit in case the source comes back among its neighbours.
        let limit = snapshot.hit_limit(max_results.saturating_add(1));
        let top = snapshot
            .searcher()
            .search(&query, &TopDocs::with_limit(limit).order_by_score())
            .map_err(|e| Error::operation(format!("Similarity search failed: {e}")))?;

        let mut ids = Vec::with_capacity(limit);
        for (_, hit) in top {
            if ids.len() == max_results {
                break;
            }
            let id = snapshot.recipe_id(hit)?;
            if id != recipe_id {
                ids.push(id);
            }
        }

        SearchResult::new(ids.len() as u64, ids, Default::default())
    }

    fn query(
        &self,
        snapshot: &IndexSnapshot,
        source: SimilaritySource<'_>,
        values: Vec<OwnedValue>,
    ) -> Result<MoreLikeThisQuery> {
        self.policy.inspect_similarity_query(&source)?;

        let max_doc_frequency = max_doc_frequency(snapshot.num_docs(), &self.config);
        Ok(MoreLikeThisQuery::builder()
            .with_min_doc_frequency(self.config.min_doc_frequency)
            .with_max_doc_frequency(max_doc_frequency)
            .with_min_term_frequency(self.config.min_term_frequency)
            .with_max_query_terms(self.config.max_query_terms)
            .with_document_fields(vec![(self.schema.fulltext, values)]))
    }
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish()
    }
}

/// Highest document frequency a selected term may have.
fn max_doc_frequency(num_docs: u64, config: &SimilarityConfig) -> u64 {
    (num_docs * config.max_doc_frequency_pct / 100).max(1)
}

fn check_max_results(max_results: usize) -> Result<()> {
    if max_results == 0 {
        return Err(Error::validation("maxResults", "must be at least 1"));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
