//! Full-text, range, diet, keyword and drill-down filtering.

use std::sync::Arc;

use larder_core::{DrillDown, NumericField, RangedSpec, SearchQuery};
use larder_fts::{NoMatchAllPolicy, PermissivePolicy};
use proptest::prelude::*;

use crate::common::{fulltext, index_recipes, run, sample_recipes, sample_searcher, sorted_ids};

// ----------------------------------------------------------------------------
// Full text
// ----------------------------------------------------------------------------

#[test]
fn test_single_term() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("garlic"));
    assert_eq!(result.total_hits(), 3);
    assert_eq!(sorted_ids(&result), vec![1, 2, 5]);
}

#[test]
fn test_terms_are_anded() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("lemon chicken"));
    assert_eq!(sorted_ids(&result), vec![4]);
}

#[test]
fn test_excluded_term() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("garlic -lemon"));
    assert_eq!(sorted_ids(&result), vec![2, 5]);
}

#[test]
fn test_only_negated_term() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("-garlic"));
    assert_eq!(sorted_ids(&result), vec![3, 4]);
}

#[test]
fn test_phrase() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("\"lemon salmon\""));
    assert_eq!(sorted_ids(&result), vec![1]);

    let result = run(&searcher, fulltext("\"salmon lemon\""));
    assert_eq!(result.total_hits(), 0);
}

#[test]
fn test_terms_are_stemmed() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("Peppers"));
    assert_eq!(sorted_ids(&result), vec![3, 4, 5]);
}

#[test]
fn test_stopword_only_query_matches_nothing() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("the"));
    assert_eq!(result.total_hits(), 0);
    assert!(result.recipe_ids().is_empty());
}

#[test]
fn test_match_all() {
    let (_indexer, searcher) = sample_searcher();
    assert_eq!(run(&searcher, fulltext("*")).total_hits(), 5);
    assert_eq!(run(&searcher, SearchQuery::builder()).total_hits(), 5);
}

#[test]
fn test_no_match_all_policy_rejects_star() {
    let (_indexer, searcher) = index_recipes(&sample_recipes(), Arc::new(NoMatchAllPolicy::default()));
    let err = searcher.search(&fulltext("*").build().unwrap()).unwrap_err();
    assert!(err.is_rejection());

    // Other queries still run.
    assert_eq!(run(&searcher, fulltext("garlic")).total_hits(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_term_and_negation_partition_corpus(
        term in prop::sample::select(vec![
            "garlic", "lemon", "salmon", "chicken", "tofu", "basil", "ginger", "pepper",
            "salt", "oil", "paprika",
        ])
    ) {
        let (_indexer, searcher) = index_recipes(&sample_recipes(), Arc::new(PermissivePolicy));
        let hits = run(&searcher, fulltext(term)).total_hits();
        let misses = run(&searcher, fulltext(&format!("-{term}"))).total_hits();
        prop_assert_eq!(hits + misses, searcher.num_docs().unwrap());
    }
}

// ----------------------------------------------------------------------------
// Ranges
// ----------------------------------------------------------------------------

#[test]
fn test_range_is_inclusive() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder().range(NumericField::Calories, RangedSpec::new(420, 450).unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![1, 4]);
}

#[test]
fn test_range_excludes_missing_values() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder().range(NumericField::PrepTime, RangedSpec::new(0, 1000).unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![1, 2, 3, 5]);
}

#[test]
fn test_ranges_combine_with_fulltext() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        fulltext("garlic").range(NumericField::PrepTime, RangedSpec::new(10, 15).unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![1, 2]);
}

#[test]
fn test_derived_ingredient_count_range() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder()
            .range(NumericField::NumIngredients, RangedSpec::new(0, 4).unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![2, 4]);
}

// ----------------------------------------------------------------------------
// Diets
// ----------------------------------------------------------------------------

#[test]
fn test_diet_threshold_filters() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().diet_threshold("keto", 0.7));
    assert_eq!(sorted_ids(&result), vec![1, 3]);

    let result = run(&searcher, SearchQuery::builder().match_diet("paleo"));
    assert_eq!(sorted_ids(&result), vec![1, 4]);
}

#[test]
fn test_several_diets_all_apply() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder()
            .diet_threshold("keto", 0.5)
            .diet_threshold("paleo", 0.9),
    );
    assert_eq!(sorted_ids(&result), vec![1, 3]);
}

#[test]
fn test_unknown_diet_is_a_validation_error() {
    let (_indexer, searcher) = sample_searcher();
    let query = SearchQuery::builder()
        .diet_threshold("carnivore", 0.5)
        .build()
        .unwrap();
    let err = searcher.search(&query).unwrap_err();
    assert!(err.is_validation());
}

// ----------------------------------------------------------------------------
// Keywords and drill-downs
// ----------------------------------------------------------------------------

#[test]
fn test_match_keyword() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().match_keyword("quick"));
    assert_eq!(sorted_ids(&result), vec![1, 3, 5]);

    let result = run(
        &searcher,
        SearchQuery::builder()
            .match_keyword("quick")
            .match_keyword("seafood"),
    );
    assert_eq!(sorted_ids(&result), vec![1]);
}

#[test]
fn test_keyword_match_is_exact() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().match_keyword("Quick"));
    assert_eq!(result.total_hits(), 0);
}

#[test]
fn test_drill_down() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder().drill_down(DrillDown::new("protein", "tofu").unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![2, 5]);
}

#[test]
fn test_drill_downs_across_dimensions_intersect() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder()
            .drill_down(DrillDown::new("protein", "tofu").unwrap())
            .drill_down(DrillDown::new("tag", "quick").unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![5]);
}

#[test]
fn test_drill_down_unknown_label_matches_nothing() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder().drill_down(DrillDown::new("protein", "beef").unwrap()),
    );
    assert_eq!(result.total_hits(), 0);
}
