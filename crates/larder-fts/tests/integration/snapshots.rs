//! Snapshot isolation between commits and reloads.

use larder_core::Recipe;

use crate::common::{fulltext, run, sample_searcher};

fn paprika_recipe() -> Recipe {
    Recipe::builder()
        .recipe_id(6)
        .name("Paprika Chicken")
        .crawl_url("https://recipes.example.com/6")
        .instructions("Simmer slowly.")
        .ingredients(["chicken", "paprika", "onion"])
        .keyword("slow")
        .build()
        .unwrap()
}

#[test]
fn test_commit_invisible_until_reload() {
    let (mut indexer, searcher) = sample_searcher();
    let before = searcher.snapshot().unwrap();

    indexer.add_recipe(&paprika_recipe()).unwrap();
    indexer.commit().unwrap();
    assert_eq!(run(&searcher, fulltext("paprika")).total_hits(), 0);

    searcher.reload().unwrap();
    let result = run(&searcher, fulltext("paprika"));
    assert_eq!(result.recipe_ids(), &[6]);

    // A snapshot taken earlier still sees the old index.
    assert_eq!(before.num_docs(), 5);
    assert_eq!(searcher.num_docs().unwrap(), 6);
    assert!(searcher.snapshot().unwrap().version() > before.version());
}

#[test]
fn test_reload_publishes_new_labels() {
    let (mut indexer, searcher) = sample_searcher();
    indexer.add_recipe(&paprika_recipe()).unwrap();
    indexer.commit().unwrap();
    searcher.reload().unwrap();

    let result = run(&searcher, fulltext("paprika"));
    let tag = result.facet("tag").unwrap();
    assert_eq!(tag.get("slow"), Some(1));
}

#[test]
fn test_readd_replaces_recipe() {
    let (mut indexer, searcher) = sample_searcher();
    let renamed = Recipe::builder()
        .recipe_id(1)
        .name("Paprika Salmon")
        .crawl_url("https://recipes.example.com/1")
        .instructions("Roast the fish until flaky.")
        .ingredients(["salmon", "paprika"])
        .build()
        .unwrap();
    indexer.add_recipe(&renamed).unwrap();
    indexer.commit().unwrap();
    searcher.reload().unwrap();

    assert_eq!(searcher.num_docs().unwrap(), 5);
    assert_eq!(run(&searcher, fulltext("paprika")).recipe_ids(), &[1]);
    assert_eq!(run(&searcher, fulltext("lemon")).recipe_ids(), &[4]);
}
