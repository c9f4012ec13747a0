//! Diet, category and range facets.

use std::sync::Arc;

use larder_core::{DrillDown, Recipe, SearchQuery};
use larder_fts::{NoMatchAllPolicy, PermissivePolicy};

use crate::common::{
    facet_counts, fulltext, index_recipes, run, sample_recipes, sample_searcher, sorted_ids,
};

fn counts(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
    pairs.iter().map(|(l, c)| (l.to_string(), *c)).collect()
}

fn keto_recipe(id: u64, base: &str, score: f32) -> Recipe {
    Recipe::builder()
        .recipe_id(id)
        .name("Keto Bowl")
        .crawl_url(format!("https://recipes.example.com/keto/{id}"))
        .instructions("Mix everything.")
        .ingredient(base)
        .diet("keto", score)
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------------
// Diet thresholds: filter vs. display
// ----------------------------------------------------------------------------

#[test]
fn test_threshold_filter_and_facet_agree() {
    let (_indexer, searcher) = index_recipes(
        &[keto_recipe(1, "avocado", 0.8), keto_recipe(2, "almond", 0.6)],
        Arc::new(PermissivePolicy),
    );

    let result = run(&searcher, SearchQuery::builder().diet_threshold("keto", 0.7));
    assert_eq!(result.total_hits(), 1);
    assert_eq!(result.recipe_ids(), &[1]);
    assert_eq!(facet_counts(&result, "diet"), counts(&[("keto", 1)]));
}

#[test]
fn test_display_facet_uses_full_score_threshold() {
    let (_indexer, searcher) = index_recipes(
        &[keto_recipe(1, "avocado", 0.8), keto_recipe(2, "almond", 0.6)],
        Arc::new(PermissivePolicy),
    );

    // Same single-document result set, but no threshold requested:
    // 0.8 falls short of the default 1.0 so keto is not displayed.
    let result = run(&searcher, fulltext("avocado"));
    assert_eq!(result.recipe_ids(), &[1]);
    assert!(result.facet("diet").is_none());
}

#[test]
fn test_diet_facets_over_corpus() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder());
    assert_eq!(
        facet_counts(&result, "diet"),
        counts(&[("paleo", 2), ("vegan", 2), ("keto", 1)])
    );
}

#[test]
fn test_requested_threshold_applies_to_its_diet_only() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().diet_threshold("keto", 0.5));
    assert_eq!(result.total_hits(), 3);
    assert_eq!(
        facet_counts(&result, "diet"),
        counts(&[("keto", 3), ("paleo", 1), ("vegan", 1)])
    );
}

// ----------------------------------------------------------------------------
// Categories
// ----------------------------------------------------------------------------

#[test]
fn test_category_facets_over_corpus() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder());
    assert_eq!(
        facet_counts(&result, "protein"),
        counts(&[("chicken", 2), ("tofu", 2), ("salmon", 1)])
    );
    assert_eq!(
        facet_counts(&result, "tag"),
        counts(&[("quick", 3), ("vegetarian", 2), ("seafood", 1)])
    );
}

#[test]
fn test_facets_follow_matching_set() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("garlic"));
    assert_eq!(
        facet_counts(&result, "protein"),
        counts(&[("tofu", 2), ("salmon", 1)])
    );
    assert_eq!(
        facet_counts(&result, "tag"),
        counts(&[("quick", 2), ("vegetarian", 2), ("seafood", 1)])
    );
    assert_eq!(
        facet_counts(&result, "diet"),
        counts(&[("vegan", 2), ("paleo", 1)])
    );
}

#[test]
fn test_drill_down_narrows_facets() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder().drill_down(DrillDown::new("protein", "tofu").unwrap()),
    );
    assert_eq!(facet_counts(&result, "protein"), counts(&[("tofu", 2)]));
}

#[test]
fn test_max_facets_limits_labels() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().max_facets(2));
    assert_eq!(
        facet_counts(&result, "diet"),
        counts(&[("paleo", 2), ("vegan", 2)])
    );
    assert_eq!(
        facet_counts(&result, "tag"),
        counts(&[("quick", 3), ("vegetarian", 2)])
    );
}

#[test]
fn test_zero_max_facets_skips_facets() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().max_facets(0));
    assert_eq!(result.total_hits(), 5);
    assert!(result.facets().is_empty());
}

#[test]
fn test_empty_result_has_no_facets() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("paprika"));
    assert_eq!(result.total_hits(), 0);
    assert!(result.facets().is_empty());
}

#[test]
fn test_policy_skips_facets_for_broad_queries() {
    let (_indexer, searcher) =
        index_recipes(&sample_recipes(), Arc::new(NoMatchAllPolicy::new(2)));

    let broad = run(&searcher, fulltext("garlic"));
    assert_eq!(broad.total_hits(), 3);
    assert!(broad.facets().is_empty());

    let narrow = run(&searcher, fulltext("chicken"));
    assert_eq!(narrow.total_hits(), 2);
    assert!(narrow.facet("protein").is_some());
}

// ----------------------------------------------------------------------------
// Range buckets
// ----------------------------------------------------------------------------

#[test]
fn test_range_facets_over_corpus() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder());

    assert_eq!(
        facet_counts(&result, "num_ingredients"),
        counts(&[("5-10", 3), ("1-4", 2)])
    );
    // 15 minutes counts toward both neighbouring buckets.
    assert_eq!(
        facet_counts(&result, "prep_time"),
        counts(&[("0-15", 3), ("15-30", 2)])
    );
    assert_eq!(
        facet_counts(&result, "cook_time"),
        counts(&[("0-15", 1), ("15-30", 1)])
    );
    assert!(result.facet("total_time").is_none());
}

#[test]
fn test_range_drill_down_narrows_results_and_facets() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder().drill_down(DrillDown::new("prep_time", "15-30").unwrap()),
    );

    assert_eq!(sorted_ids(&result), vec![2, 5]);
    assert_eq!(
        facet_counts(&result, "prep_time"),
        counts(&[("15-30", 2), ("0-15", 1)])
    );
    assert_eq!(facet_counts(&result, "num_ingredients"), counts(&[("1-4", 1), ("5-10", 1)]));
}

#[test]
fn test_range_drill_down_combines_with_categories() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(
        &searcher,
        SearchQuery::builder()
            .drill_down(DrillDown::new("num_ingredients", "1-4").unwrap())
            .drill_down(DrillDown::new("protein", "chicken").unwrap()),
    );
    assert_eq!(sorted_ids(&result), vec![4]);
}

#[test]
fn test_range_drill_down_rejects_unknown_label() {
    let err = DrillDown::new("cook_time", "10-20").unwrap_err();
    assert!(err.is_validation());
}
