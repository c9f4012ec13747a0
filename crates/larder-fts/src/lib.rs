//! Faceted recipe search on top of Tantivy.
//!
//! This crate indexes [`Recipe`](larder_core::Recipe) records and answers
//! [`SearchQuery`](larder_core::SearchQuery) requests combining full-text
//! matching, numeric ranges, diet thresholds, drill-downs, sorting,
//! pagination, facet counts and "more like this" lookups.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      larder-fts                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchBackend trait                                        │
//! │  └── BlockingSearchBackend (Searcher on the blocking pool)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Searcher: IndexSnapshot, QueryCompiler, SearchPolicy       │
//! │            facet collectors, SimilarityEngine               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Indexer: DocumentBuilder, CategoryExtractors, Taxonomy     │
//! │  IndexBuilder (JSON-lines batch indexing)                   │
//! │  IndexMetadata (schema version, diets, dimensions)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RecipeSchema, recipe_en analyzer, association codec        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use larder_core::{Recipe, SearchQuery};
//! use larder_fts::{CategoryExtractors, EngineConfig, Indexer, PermissivePolicy};
//!
//! let mut indexer = Indexer::in_memory(&EngineConfig::default(), CategoryExtractors::new())?;
//! indexer.add_recipe(&recipe)?;
//! indexer.commit()?;
//!
//! let searcher = indexer.searcher(Arc::new(PermissivePolicy))?;
//! let query = SearchQuery::builder()
//!     .fulltext("garlic -butter")
//!     .diet_threshold("keto", 0.7)
//!     .build()?;
//!
//! let result = searcher.search(&query)?;
//! println!("{} recipes", result.total_hits());
//! ```

pub mod association;
pub mod backend;
pub mod builder;
pub mod document;
pub mod extractor;
pub mod facets;
pub mod fulltext;
pub mod indexer;
pub mod metadata;
pub mod policy;
pub mod query;
pub mod schema;
pub mod searcher;
pub mod similarity;
pub mod snapshot;
pub mod stopwords;
pub mod taxonomy;
pub mod types;

// Re-exports
pub use backend::{BlockingSearchBackend, SearchBackend, search_all};
pub use builder::{IndexBuilder, IndexStats};
pub use document::DocumentBuilder;
pub use extractor::{CategoryExtractor, CategoryExtractors, DimensionConfig};
pub use facets::{
    AssociationCounts, AssociationThresholdCollector, DEFAULT_THRESHOLD, RangeBucketCollector,
    RangeCounts,
};
pub use fulltext::{FulltextParser, FulltextQuery};
pub use indexer::Indexer;
pub use metadata::IndexMetadata;
pub use policy::{NoMatchAllPolicy, PermissivePolicy, SearchPolicy};
pub use query::{Clause, CompiledQuery, QueryCompiler};
pub use schema::{DIET_DIMENSION, RecipeSchema, SCHEMA_VERSION};
pub use searcher::{Searcher, SearcherBuilder};
pub use similarity::{SimilarityEngine, SimilaritySource};
pub use snapshot::{IndexSnapshot, SnapshotHandle};
pub use stopwords::StopwordList;
pub use taxonomy::{FacetPath, Taxonomy};
pub use types::{EngineConfig, SimilarityConfig};
