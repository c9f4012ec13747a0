//! "More like this" searches.

use std::sync::Arc;

use larder_core::{Error, Result};
use larder_fts::{FulltextQuery, SearchPolicy, SimilaritySource};

use crate::common::{fulltext, index_recipes, run, sample_recipes, sample_searcher};

/// Allows free-text lookups only when they carry at least `min_len` bytes.
struct MinTextPolicy {
    min_len: usize,
}

impl SearchPolicy for MinTextPolicy {
    fn inspect_parsed_fulltext_query(&self, _query: &FulltextQuery) -> Result<()> {
        Ok(())
    }

    fn should_compute_facets(&self, _total_hits: u64) -> bool {
        true
    }

    fn inspect_similarity_query(&self, source: &SimilaritySource<'_>) -> Result<()> {
        match source {
            SimilaritySource::Text(text) if text.trim().len() < self.min_len => {
                Err(Error::rejected("similarity text too short"))
            }
            _ => Ok(()),
        }
    }
}

#[test]
fn test_similar_recipe_excludes_source() {
    let (_indexer, searcher) = sample_searcher();
    for id in 1..=5 {
        let result = searcher.find_similar_recipe(id, 3).unwrap();
        assert!(!result.recipe_ids().contains(&id));
        assert!(result.recipe_ids().len() <= 3);
        assert_eq!(result.total_hits(), result.recipe_ids().len() as u64);
    }
}

#[test]
fn test_similar_recipe_unknown_id_is_empty() {
    let (_indexer, searcher) = sample_searcher();
    let result = searcher.find_similar_recipe(99, 5).unwrap();
    assert_eq!(result.total_hits(), 0);
    assert!(result.recipe_ids().is_empty());
    assert!(result.facets().is_empty());
}

#[test]
fn test_similar_text_finds_overlap() {
    let (_indexer, searcher) = sample_searcher();
    let result = searcher.find_similar_text("lemon chicken", 5).unwrap();
    assert!(result.recipe_ids().contains(&4));
    assert!(result.recipe_ids().len() <= 5);
}

#[test]
fn test_similar_zero_results_is_rejected() {
    let (_indexer, searcher) = sample_searcher();
    assert!(searcher.find_similar_text("garlic", 0).unwrap_err().is_validation());
    assert!(searcher.find_similar_recipe(1, 0).unwrap_err().is_validation());
}

#[test]
fn test_similar_huge_max_results_is_capped() {
    let (_indexer, searcher) = sample_searcher();

    let text = searcher.find_similar_text("garlic lemon", usize::MAX).unwrap();
    assert!(!text.recipe_ids().is_empty());
    assert!(text.recipe_ids().len() <= 5);

    let recipe = searcher.find_similar_recipe(1, usize::MAX).unwrap();
    assert!(!recipe.recipe_ids().contains(&1));
    assert!(recipe.recipe_ids().len() <= 4);
}

#[test]
fn test_common_terms_are_never_selected() {
    let (_indexer, searcher) = sample_searcher();

    // "oil" appears in four of the five recipes.
    let common = searcher.find_similar_text("oil", 5).unwrap();
    assert_eq!(common.total_hits(), 0);
    assert!(common.recipe_ids().is_empty());

    let rare = searcher.find_similar_text("salmon", 5).unwrap();
    assert_eq!(rare.recipe_ids(), &[1]);
}

#[test]
fn test_policy_can_reject_similarity_lookups() {
    let (_indexer, searcher) =
        index_recipes(&sample_recipes(), Arc::new(MinTextPolicy { min_len: 10 }));

    let err = searcher.find_similar_text("salmon", 5).unwrap_err();
    assert!(err.is_rejection());

    let accepted = searcher.find_similar_text("salmon with lemon", 5).unwrap();
    assert!(accepted.recipe_ids().contains(&1));
    assert!(searcher.find_similar_recipe(1, 5).is_ok());

    // Regular searches never consult the similarity hook.
    assert_eq!(run(&searcher, fulltext("salmon")).recipe_ids(), &[1]);
}
