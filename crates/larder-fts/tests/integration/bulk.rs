//! Bulk indexing from JSON lines.

use std::sync::Arc;

use larder_fts::{EngineConfig, IndexBuilder, Indexer, PermissivePolicy};

use crate::common::{extractors, fulltext, run, sample_recipes};

#[tokio::test]
async fn test_build_from_jsonl() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("recipes.jsonl");
    let mut lines: Vec<String> = sample_recipes()
        .iter()
        .map(|r| r.to_json().unwrap())
        .collect();
    lines.insert(2, "not a recipe".to_string());
    std::fs::write(&input, lines.join("\n")).unwrap();

    let mut indexer = Indexer::in_memory(&EngineConfig::default(), extractors()).unwrap();
    let stats = IndexBuilder::new()
        .with_batch_size(2)
        .merge_after_build(true)
        .build(&input, &mut indexer)
        .await
        .unwrap();

    assert_eq!(stats.recipes_indexed, 5);
    assert_eq!(stats.lines_skipped, 1);
    assert_eq!(stats.commits, 3);
    assert_eq!(indexer.num_segments(), 1);

    let searcher = indexer.searcher(Arc::new(PermissivePolicy)).unwrap();
    assert_eq!(run(&searcher, fulltext("garlic")).total_hits(), 3);
}
