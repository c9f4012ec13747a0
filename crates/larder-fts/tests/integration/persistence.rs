//! Data directory round trips: indexer on disk, searcher from the builder.

use larder_fts::{EngineConfig, IndexMetadata, Indexer, Searcher, Taxonomy};

use crate::common::{extractors, fulltext, run, sample_recipes};

fn write_sample_index(dir: &std::path::Path) {
    let mut indexer = Indexer::open(dir, &EngineConfig::default(), extractors()).unwrap();
    for recipe in sample_recipes() {
        indexer.add_recipe(&recipe).unwrap();
    }
    indexer.close().unwrap();
}

#[test]
fn test_searcher_opens_data_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_sample_index(temp_dir.path());

    let searcher = Searcher::builder()
        .data_directory(temp_dir.path())
        .build()
        .unwrap();
    assert_eq!(searcher.num_docs().unwrap(), 5);

    let result = run(&searcher, fulltext("garlic"));
    assert_eq!(result.total_hits(), 3);
    assert_eq!(result.facet("protein").unwrap().get("tofu"), Some(2));
}

#[test]
fn test_data_directory_layout() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_sample_index(temp_dir.path());

    assert!(temp_dir.path().join("index").join("meta.json").exists());

    let taxonomy = Taxonomy::load(temp_dir.path()).unwrap();
    assert!(taxonomy.ordinal("protein", "salmon").is_some());
    assert!(taxonomy.ordinal("diet", "vegan").is_some());

    let metadata = IndexMetadata::load(temp_dir.path()).unwrap().unwrap();
    assert_eq!(metadata.document_count, 5);
    assert_eq!(metadata.dimensions.len(), 2);
    assert!(metadata.committed_at_datetime().is_some());
}

#[test]
fn test_reopen_keeps_taxonomy_ordinals() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_sample_index(temp_dir.path());
    let before = Taxonomy::load(temp_dir.path()).unwrap();

    let mut indexer =
        Indexer::open(temp_dir.path(), &EngineConfig::default(), extractors()).unwrap();
    assert_eq!(indexer.num_docs(), 5);
    let extra = larder_core::Recipe::builder()
        .recipe_id(7)
        .name("Ginger Salmon")
        .crawl_url("https://recipes.example.com/7")
        .instructions("Steam gently.")
        .ingredients(["salmon", "ginger"])
        .keyword("steamed")
        .build()
        .unwrap();
    indexer.add_recipe(&extra).unwrap();
    indexer.close().unwrap();

    let after = Taxonomy::load(temp_dir.path()).unwrap();
    for (ordinal, path) in before.iter() {
        assert_eq!(after.ordinal(&path.dimension, &path.label), Some(ordinal));
    }
    assert!(after.ordinal("tag", "steamed").is_some());
}

#[test]
fn test_searcher_requires_existing_index() {
    let temp_dir = tempfile::tempdir().unwrap();
    let err = Searcher::builder()
        .data_directory(temp_dir.path())
        .build()
        .unwrap_err();
    assert!(err.is_config());
}
