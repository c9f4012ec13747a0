//! The async backend over a shared searcher.

use std::sync::Arc;

use larder_core::SearchQuery;
use larder_fts::{BlockingSearchBackend, SearchBackend, search_all};

use crate::common::{fulltext, sample_searcher};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_searches_agree() {
    let (_indexer, searcher) = sample_searcher();
    let backend = BlockingSearchBackend::new(Arc::new(searcher));

    let queries: Vec<SearchQuery> = ["garlic", "-garlic", "chicken", "tofu", "*"]
        .into_iter()
        .map(|text| fulltext(text).build().unwrap())
        .collect();
    let results = search_all(&backend, queries).await.unwrap();

    let totals: Vec<u64> = results.iter().map(|r| r.total_hits()).collect();
    assert_eq!(totals, vec![3, 2, 2, 2, 5]);
}

#[tokio::test]
async fn test_backend_as_trait_object() {
    let (_indexer, searcher) = sample_searcher();
    let backend: Box<dyn SearchBackend> = Box::new(BlockingSearchBackend::new(Arc::new(searcher)));

    let similar = backend.find_similar_recipe(4, 2).await.unwrap();
    assert!(!similar.recipe_ids().contains(&4));

    let err = backend
        .search(SearchQuery::builder().diet_threshold("carnivore", 0.5).build().unwrap())
        .await
        .unwrap_err();
    assert!(err.is_validation());
}
