//! Query pipeline.
//!
//! `Searcher` answers [`SearchQuery`] and similarity requests against an
//! immutable [`IndexSnapshot`]. The reader uses `ReloadPolicy::Manual`:
//! commits made after the snapshot was taken stay invisible until
//! [`Searcher::reload`] is called.
//!
//! # Usage
//!
//! ```rust,ignore
//! use larder_fts::{NoMatchAllPolicy, Searcher};
//!
//! let searcher = Searcher::builder()
//!     .data_directory(&data_dir)
//!     .search_policy(Arc::new(NoMatchAllPolicy::new(10_000)))
//!     .build()?;
//!
//! let result = searcher.search(&query)?;
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use larder_core::{Error, FacetData, Result, SearchQuery, SearchResult, SortOrder};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::Query;
use tantivy::{DocAddress, DocId, Index, IndexReader, ReloadPolicy, Score, SegmentReader};

use crate::facets::{
    AssociationThresholdCollector, RangeBucketCollector, category_collector, category_facets,
};
use crate::fulltext::FulltextParser;
use crate::metadata::IndexMetadata;
use crate::policy::{PermissivePolicy, SearchPolicy};
use crate::query::QueryCompiler;
use crate::schema::{
    CATEGORY_FIELD, DIET_ASSOCIATION_FIELD, DIET_DIMENSION, RecipeSchema, recipe_analyzer,
    sort_field_name,
};
use crate::similarity::SimilarityEngine;
use crate::snapshot::{IndexSnapshot, SnapshotHandle};
use crate::taxonomy::Taxonomy;
use crate::types::EngineConfig;

/// Name of the Tantivy index directory inside the data directory.
pub(crate) const INDEX_DIR: &str = "index";

/// Where a searcher gets the taxonomy matching its snapshot.
#[derive(Debug, Clone)]
pub(crate) enum TaxonomySource {
    /// Published in memory by an indexer in the same process.
    Shared(Arc<RwLock<Arc<Taxonomy>>>),
    /// Persisted in a data directory.
    File(PathBuf),
}

impl TaxonomySource {
    fn load(&self) -> Result<Arc<Taxonomy>> {
        match self {
            TaxonomySource::Shared(slot) => {
                let guard = slot
                    .read()
                    .map_err(|_| Error::operation("Taxonomy lock poisoned"))?;
                Ok(Arc::clone(&guard))
            }
            TaxonomySource::File(data_dir) => Ok(Arc::new(Taxonomy::load(data_dir)?)),
        }
    }
}

/// Read side of the engine.
pub struct Searcher {
    reader: IndexReader,
    schema: RecipeSchema,
    compiler: QueryCompiler,
    similarity: SimilarityEngine,
    taxonomy: TaxonomySource,
    snapshot: SnapshotHandle,
    version: AtomicU64,
}

impl Searcher {
    /// Start configuring a searcher over a data directory.
    pub fn builder() -> SearcherBuilder {
        SearcherBuilder::default()
    }

    pub(crate) fn from_parts(
        index: &Index,
        schema: RecipeSchema,
        config: &EngineConfig,
        taxonomy: TaxonomySource,
        policy: Arc<dyn SearchPolicy>,
    ) -> Result<Self> {
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::operation(format!("Failed to create index reader: {e}")))?;

        let parser = FulltextParser::new(recipe_analyzer(config));
        let compiler = QueryCompiler::new(schema.clone(), parser, Arc::clone(&policy));
        let similarity = SimilarityEngine::new(schema.clone(), config.similarity.clone(), policy);

        let first = IndexSnapshot::new(0, reader.searcher(), taxonomy.load()?, schema.recipe_id);

        Ok(Self {
            reader,
            schema,
            compiler,
            similarity,
            taxonomy,
            snapshot: SnapshotHandle::new(first),
            version: AtomicU64::new(0),
        })
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        self.snapshot.load()
    }

    /// Pick up the latest commit.
    ///
    /// Queries already running keep the snapshot they started with.
    pub fn reload(&self) -> Result<()> {
        self.reader
            .reload()
            .map_err(|e| Error::operation(format!("Failed to reload index reader: {e}")))?;
        // Loaded after the reader: the taxonomy is published before each
        // commit, so it covers every ordinal the new segments reference.
        let taxonomy = self.taxonomy.load()?;

        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot =
            IndexSnapshot::new(version, self.reader.searcher(), taxonomy, self.schema.recipe_id);
        log::debug!("Reloaded {snapshot:?}");
        self.snapshot.publish(snapshot)
    }

    /// Number of documents in the current snapshot.
    pub fn num_docs(&self) -> Result<u64> {
        Ok(self.snapshot()?.num_docs())
    }

    /// Address of the document indexed under `recipe_id`.
    pub fn find_doc(&self, recipe_id: u64) -> Result<Option<DocAddress>> {
        self.snapshot()?.find_doc(recipe_id)
    }

    /// The schema queries are compiled against.
    pub fn schema(&self) -> &RecipeSchema {
        &self.schema
    }

    /// The query compiler.
    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    /// Run a search.
    ///
    /// `total_hits` is always the full match count. An offset at or past
    /// the end yields an empty page, not an error.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        let snapshot = self.snapshot()?;
        let compiled = self.compiler.compile(query)?;
        let tantivy_query = self.compiler.to_query(&compiled)?;

        // Never ask for more hits than there are documents.
        let limit = snapshot.hit_limit(query.offset().saturating_add(query.max_results()));

        let (total_hits, ranked) = rank(
            &snapshot,
            tantivy_query.as_ref(),
            query.sort(),
            limit,
        )?;

        let recipe_ids = ranked
            .into_iter()
            .skip(query.offset())
            .take(query.max_results())
            .map(|addr| snapshot.recipe_id(addr))
            .collect::<Result<Vec<_>>>()?;

        let facets = if query.max_facets() > 0
            && self.compiler.policy().should_compute_facets(total_hits)
        {
            compute_facets(&snapshot, tantivy_query.as_ref(), query)?
        } else {
            BTreeMap::new()
        };

        log::debug!(
            "Search matched {total_hits} recipes, returning {} from offset {}",
            recipe_ids.len(),
            query.offset()
        );
        SearchResult::new(total_hits, recipe_ids, facets)
    }

    /// Recipes similar to free text.
    pub fn find_similar_text(&self, text: &str, max_results: usize) -> Result<SearchResult> {
        let snapshot = self.snapshot()?;
        self.similarity.find_similar_text(&snapshot, text, max_results)
    }

    /// Recipes similar to an indexed recipe; empty if the id is unknown.
    pub fn find_similar_recipe(&self, recipe_id: u64, max_results: usize) -> Result<SearchResult> {
        let snapshot = self.snapshot()?;
        self.similarity
            .find_similar_recipe(&snapshot, recipe_id, max_results)
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("schema", &self.schema)
            .field("version", &self.version.load(Ordering::SeqCst))
            .finish()
    }
}

/// Total match count and the first `limit` documents in `sort` order.
fn rank(
    snapshot: &IndexSnapshot,
    query: &dyn Query,
    sort: SortOrder,
    limit: usize,
) -> Result<(u64, Vec<DocAddress>)> {
    let searcher = snapshot.searcher();
    let failed = |e: tantivy::TantivyError| Error::operation(format!("Search failed: {e}"));

    match sort.numeric_field() {
        None => {
            let (count, top) = searcher
                .search(query, &(Count, TopDocs::with_limit(limit).order_by_score()))
                .map_err(failed)?;
            Ok((count as u64, top.into_iter().map(|(_, addr)| addr).collect()))
        }
        Some(field) => {
            // Ascending by value, missing values last, then best score first.
            let name = sort_field_name(field);
            let top_docs = TopDocs::with_limit(limit).tweak_score(
                move |segment_reader: &SegmentReader| {
                    let column = segment_reader.fast_fields().u64(&name).ok();
                    move |doc: DocId, score: Score| {
                        let value = column
                            .as_ref()
                            .and_then(|c| c.first(doc))
                            .unwrap_or(u64::MAX);
                        (Reverse(value), score)
                    }
                },
            );
            let (count, top) = searcher
                .search(query, &(Count, top_docs))
                .map_err(failed)?;
            Ok((count as u64, top.into_iter().map(|(_, addr)| addr).collect()))
        }
    }
}

/// Diet, category and range facets over every document matching `query`.
fn compute_facets(
    snapshot: &IndexSnapshot,
    query: &dyn Query,
    request: &SearchQuery,
) -> Result<BTreeMap<String, FacetData>> {
    let taxonomy = snapshot.taxonomy();
    let dimensions: BTreeSet<&str> = taxonomy
        .iter()
        .map(|(_, path)| path.dimension.as_str())
        .filter(|dimension| *dimension != DIET_DIMENSION)
        .collect();

    let diets = AssociationThresholdCollector::new(
        DIET_ASSOCIATION_FIELD,
        Arc::clone(taxonomy),
        request.diet_threshold(),
    );
    let categories = category_collector(CATEGORY_FIELD, dimensions.iter().copied());
    let ranges = RangeBucketCollector::default();

    let (diet_counts, category_counts, range_counts) = snapshot
        .searcher()
        .search(query, &(diets, categories, ranges))
        .map_err(|e| Error::operation(format!("Facet computation failed: {e}")))?;

    let n = request.max_facets();
    let mut facets = category_facets(&category_counts, dimensions.iter().copied(), n);
    facets.extend(range_counts.facets(n));
    if let Some(diet) = diet_counts.top_children(n, DIET_DIMENSION) {
        facets.insert(DIET_DIMENSION.to_string(), diet);
    }
    Ok(facets)
}

/// Builder for [`Searcher`].
#[derive(Default)]
pub struct SearcherBuilder {
    data_directory: Option<PathBuf>,
    policy: Option<Arc<dyn SearchPolicy>>,
    config: Option<EngineConfig>,
}

impl SearcherBuilder {
    /// Data directory written by an [`Indexer`](crate::Indexer). Required.
    pub fn data_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Search policy; defaults to [`PermissivePolicy`].
    pub fn search_policy(mut self, policy: Arc<dyn SearchPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Engine configuration; must match the one used for indexing.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Open the index and take the first snapshot.
    pub fn build(self) -> Result<Searcher> {
        let data_dir = self
            .data_directory
            .ok_or_else(|| Error::config("Searcher requires a data directory"))?;
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let policy = self.policy.unwrap_or_else(|| Arc::new(PermissivePolicy));

        if !data_dir.is_dir() {
            return Err(Error::config(format!(
                "Data directory {} does not exist",
                data_dir.display()
            )));
        }
        if let Some(metadata) = IndexMetadata::load(&data_dir)? {
            metadata.check_schema_version()?;
        }

        let index_path = data_dir.join(INDEX_DIR);
        if !index_path.join("meta.json").exists() {
            return Err(Error::config(format!(
                "No index found in {}",
                data_dir.display()
            )));
        }
        let index = Index::open_in_dir(&index_path)
            .map_err(|e| Error::operation(format!("Failed to open index: {e}")))?;
        let schema = RecipeSchema::from_schema(index.schema())?;
        RecipeSchema::register_tokenizers(&index, &config);

        log::info!("Opened recipe index at {}", index_path.display());
        Searcher::from_parts(
            &index,
            schema,
            &config,
            TaxonomySource::File(data_dir),
            policy,
        )
    }
}

impl std::fmt::Debug for SearcherBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearcherBuilder")
            .field("data_directory", &self.data_directory)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
