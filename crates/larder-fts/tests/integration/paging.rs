//! Sorting and pagination.

use std::sync::Arc;

use larder_core::{Recipe, SearchQuery, SortOrder};
use larder_fts::PermissivePolicy;

use crate::common::{fulltext, index_recipes, run, sample_searcher};

fn garlic_recipe(id: u64, name: &str, instructions: &str) -> Recipe {
    Recipe::builder()
        .recipe_id(id)
        .name(name)
        .crawl_url(format!("https://recipes.example.com/garlic/{id}"))
        .instructions(instructions)
        .ingredients(["garlic", "butter"])
        .build()
        .unwrap()
}

#[test]
fn test_sort_by_prep_time_puts_missing_last() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().sort(SortOrder::PrepTime));
    assert_eq!(result.recipe_ids(), &[3, 1, 2, 5, 4]);
}

#[test]
fn test_sort_by_calories() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().sort(SortOrder::Calories));
    assert_eq!(result.recipe_ids(), &[2, 1, 4, 3, 5]);
}

#[test]
fn test_sort_applies_within_matches() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, fulltext("garlic").sort(SortOrder::PrepTime));
    assert_eq!(result.recipe_ids(), &[1, 2, 5]);
}

#[test]
fn test_pages_are_contiguous() {
    let (_indexer, searcher) = sample_searcher();
    let page = |offset: usize| {
        run(
            &searcher,
            SearchQuery::builder()
                .sort(SortOrder::PrepTime)
                .max_results(2)
                .offset(offset),
        )
    };

    let first = page(0);
    let second = page(2);
    let third = page(4);
    assert_eq!(first.recipe_ids(), &[3, 1]);
    assert_eq!(second.recipe_ids(), &[2, 5]);
    assert_eq!(third.recipe_ids(), &[4]);
    for result in [&first, &second, &third] {
        assert_eq!(result.total_hits(), 5);
    }
}

#[test]
fn test_relevance_pages_match_single_page() {
    let (_indexer, searcher) = sample_searcher();
    let all = run(&searcher, fulltext("garlic"));

    let paged: Vec<u64> = (0..3)
        .flat_map(|offset| {
            run(&searcher, fulltext("garlic").max_results(1).offset(offset))
                .recipe_ids()
                .to_vec()
        })
        .collect();
    assert_eq!(paged, all.recipe_ids());
}

#[test]
fn test_offset_past_end_is_empty_page() {
    let (_indexer, searcher) = sample_searcher();
    for offset in [5, 6, 1_000] {
        let result = run(
            &searcher,
            SearchQuery::builder().sort(SortOrder::PrepTime).offset(offset),
        );
        assert_eq!(result.total_hits(), 5);
        assert!(result.recipe_ids().is_empty());
    }
}

#[test]
fn test_max_results_larger_than_corpus() {
    let (_indexer, searcher) = sample_searcher();
    let result = run(&searcher, SearchQuery::builder().max_results(usize::MAX));
    assert_eq!(result.recipe_ids().len(), 5);
}

#[test]
fn test_missing_sort_values_fall_back_to_relevance() {
    // Neither recipe has calories; the second mentions garlic far more often.
    let (_indexer, searcher) = index_recipes(
        &[
            garlic_recipe(1, "Buttered Toast", "Toast the bread."),
            garlic_recipe(
                2,
                "Garlic Soup",
                "Roast the garlic, then simmer garlic with more garlic.",
            ),
        ],
        Arc::new(PermissivePolicy),
    );

    let by_relevance = run(&searcher, fulltext("garlic"));
    assert_eq!(by_relevance.recipe_ids(), &[2, 1]);

    let by_calories = run(&searcher, fulltext("garlic").sort(SortOrder::Calories));
    assert_eq!(by_calories.recipe_ids(), by_relevance.recipe_ids());
}
