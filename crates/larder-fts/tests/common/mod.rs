//! Common fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use larder_core::{Recipe, SearchQuery, SearchQueryBuilder, SearchResult};
use larder_fts::{
    CategoryExtractors, EngineConfig, Indexer, PermissivePolicy, SearchPolicy, Searcher,
};

const PROTEINS: [&str; 3] = ["salmon", "chicken", "tofu"];

/// Five recipes sharing a small vocabulary.
///
/// | id | name                 | prep | calories | keto | paleo | vegan | keywords          |
/// |----|----------------------|------|----------|------|-------|-------|-------------------|
/// | 1  | Garlic Lemon Salmon  | 10   | 420      | 0.8  | 1.0   |       | quick, seafood    |
/// | 2  | Ginger Garlic Tofu   | 15   | 300      | 0.6  |       | 1.0   | vegetarian        |
/// | 3  | Basil Chicken        | 5    | 510      | 1.0  | 0.9   |       | quick             |
/// | 4  | Lemon Pepper Chicken |      | 450      |      | 1.0   |       |                   |
/// | 5  | Tofu Basil Stir Fry  | 20   |          |      |       | 1.0   | quick, vegetarian |
pub fn sample_recipes() -> Vec<Recipe> {
    vec![
        Recipe::builder()
            .recipe_id(1)
            .name("Garlic Lemon Salmon")
            .crawl_url("https://recipes.example.com/1")
            .instructions("Roast the fish until flaky.")
            .ingredients(["salmon", "garlic", "lemon", "salt", "oil"])
            .diet("keto", 0.8)
            .diet("paleo", 1.0)
            .keyword("quick")
            .keyword("seafood")
            .prep_time(10)
            .cook_time(15)
            .calories(420)
            .build()
            .unwrap(),
        Recipe::builder()
            .recipe_id(2)
            .name("Ginger Garlic Tofu")
            .crawl_url("https://recipes.example.com/2")
            .instructions("Fry until golden.")
            .ingredients(["tofu", "ginger", "garlic", "oil"])
            .diet("keto", 0.6)
            .diet("vegan", 1.0)
            .keyword("vegetarian")
            .prep_time(15)
            .calories(300)
            .build()
            .unwrap(),
        Recipe::builder()
            .recipe_id(3)
            .name("Basil Chicken")
            .crawl_url("https://recipes.example.com/3")
            .instructions("Grill and serve warm.")
            .ingredients(["chicken", "basil", "pepper", "salt", "oil"])
            .diet("keto", 1.0)
            .diet("paleo", 0.9)
            .keyword("quick")
            .prep_time(5)
            .calories(510)
            .build()
            .unwrap(),
        Recipe::builder()
            .recipe_id(4)
            .name("Lemon Pepper Chicken")
            .crawl_url("https://recipes.example.com/4")
            .instructions("Bake for twenty minutes.")
            .ingredients(["chicken", "lemon", "pepper", "salt"])
            .diet("paleo", 1.0)
            .calories(450)
            .build()
            .unwrap(),
        Recipe::builder()
            .recipe_id(5)
            .name("Tofu Basil Stir Fry")
            .crawl_url("https://recipes.example.com/5")
            .instructions("Stir over high heat.")
            .ingredients(["tofu", "basil", "garlic", "pepper", "oil"])
            .diet("vegan", 1.0)
            .keyword("quick")
            .keyword("vegetarian")
            .prep_time(20)
            .build()
            .unwrap(),
    ]
}

/// `protein` (single-valued, first known protein) and `tag` (keywords).
pub fn extractors() -> CategoryExtractors {
    CategoryExtractors::new()
        .add_category("protein", false, |recipe: &Recipe| {
            recipe
                .ingredients()
                .iter()
                .find(|i| PROTEINS.contains(&i.as_str()))
                .map(|i| BTreeSet::from([i.clone()]))
                .unwrap_or_default()
        })
        .unwrap()
        .add_category("tag", true, |recipe: &Recipe| recipe.keywords().clone())
        .unwrap()
}

/// Index `recipes` in memory and return the indexer with a fresh searcher.
pub fn index_recipes(recipes: &[Recipe], policy: Arc<dyn SearchPolicy>) -> (Indexer, Searcher) {
    let mut indexer = Indexer::in_memory(&EngineConfig::default(), extractors()).unwrap();
    for recipe in recipes {
        indexer.add_recipe(recipe).unwrap();
    }
    indexer.commit().unwrap();

    let searcher = indexer.searcher(policy).unwrap();
    (indexer, searcher)
}

/// The sample corpus behind a permissive searcher.
pub fn sample_searcher() -> (Indexer, Searcher) {
    index_recipes(&sample_recipes(), Arc::new(PermissivePolicy))
}

/// Run a query built from `builder`.
pub fn run(searcher: &Searcher, builder: SearchQueryBuilder) -> SearchResult {
    searcher.search(&builder.build().unwrap()).unwrap()
}

/// Shorthand for a full-text-only query.
pub fn fulltext(text: &str) -> SearchQueryBuilder {
    SearchQuery::builder().fulltext(text)
}

/// Result ids in ascending order.
pub fn sorted_ids(result: &SearchResult) -> Vec<u64> {
    let mut ids = result.recipe_ids().to_vec();
    ids.sort_unstable();
    ids
}

/// Labels and counts of one facet dimension, in result order.
pub fn facet_counts(result: &SearchResult, dimension: &str) -> Vec<(String, u64)> {
    result
        .facet(dimension)
        .map(|data| {
            data.children
                .iter()
                .map(|c| (c.label.clone(), c.count))
                .collect()
        })
        .unwrap_or_default()
}
