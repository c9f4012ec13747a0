//! Tantivy index writer wrapper.
//!
//! `Indexer` is the single writer of a recipe index. It converts recipes
//! into documents, grows the taxonomy, and publishes both on commit.
//!
//! # Data directory layout
//!
//! ```text
//! <data_dir>/
//!   index/                 Tantivy index
//!   taxonomy.json          facet path ordinals
//!   larder-metadata.json   schema version, diets, dimensions, counts
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use larder_fts::{CategoryExtractors, EngineConfig, Indexer};
//!
//! let extractors = CategoryExtractors::new()
//!     .add_category("keyword", true, |r: &Recipe| r.keywords().clone())?;
//! let mut indexer = Indexer::open(&data_dir, &EngineConfig::default(), extractors)?;
//!
//! indexer.add_recipe(&recipe)?;
//! indexer.commit()?;
//! indexer.close()?;
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use larder_core::{Error, Recipe, Result};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Term};

use crate::document::DocumentBuilder;
use crate::extractor::CategoryExtractors;
use crate::metadata::IndexMetadata;
use crate::policy::SearchPolicy;
use crate::schema::RecipeSchema;
use crate::searcher::{INDEX_DIR, Searcher, TaxonomySource};
use crate::taxonomy::Taxonomy;
use crate::types::EngineConfig;

/// Single writer of a recipe index.
///
/// Mutating methods take `&mut self`; concurrent writes to one index are
/// not supported.
pub struct Indexer {
    index: Index,
    writer: IndexWriter,
    reader: IndexReader,
    documents: DocumentBuilder,
    config: EngineConfig,
    taxonomy: Taxonomy,
    published: Arc<RwLock<Arc<Taxonomy>>>,
    data_dir: Option<PathBuf>,
    pending: u64,
}

impl Indexer {
    /// Create or open the index in `data_dir`.
    ///
    /// `data_dir` must already exist. An existing index must have been built
    /// with the same diets and the current schema version.
    pub fn open(
        data_dir: &Path,
        config: &EngineConfig,
        extractors: CategoryExtractors,
    ) -> Result<Self> {
        config.validate()?;
        if !data_dir.is_dir() {
            return Err(Error::config(format!(
                "Data directory {} does not exist",
                data_dir.display()
            )));
        }
        if let Some(metadata) = IndexMetadata::load(data_dir)? {
            metadata.check_schema_version()?;
        }

        let index_path = data_dir.join(INDEX_DIR);
        if !index_path.exists() {
            std::fs::create_dir_all(&index_path)
                .map_err(|e| Error::io_with_path(e, &index_path))?;
        }

        // Create or open index
        let (index, schema) = if index_path.join("meta.json").exists() {
            let index = Index::open_in_dir(&index_path)
                .map_err(|e| Error::operation(format!("Failed to open index: {e}")))?;
            let schema = RecipeSchema::from_schema(index.schema())?;
            check_diets(&schema, config)?;
            log::info!("Opened recipe index at {}", index_path.display());
            (index, schema)
        } else {
            let schema = RecipeSchema::build(&config.diets)?;
            let index = Index::create_in_dir(&index_path, schema.schema().clone())
                .map_err(|e| Error::operation(format!("Failed to create index: {e}")))?;
            log::info!("Created recipe index at {}", index_path.display());
            (index, schema)
        };

        let taxonomy = Taxonomy::load(data_dir)?;
        Self::from_index(index, schema, config, extractors, taxonomy, Some(data_dir.to_path_buf()))
    }

    /// Create an in-memory index (for testing and ephemeral use).
    pub fn in_memory(config: &EngineConfig, extractors: CategoryExtractors) -> Result<Self> {
        config.validate()?;
        let schema = RecipeSchema::build(&config.diets)?;
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(index, schema, config, extractors, Taxonomy::new(), None)
    }

    fn from_index(
        index: Index,
        schema: RecipeSchema,
        config: &EngineConfig,
        extractors: CategoryExtractors,
        taxonomy: Taxonomy,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        // Register tokenizers
        RecipeSchema::register_tokenizers(&index, config);

        // Create writer
        let writer = index
            .writer(config.writer_buffer_bytes)
            .map_err(|e| Error::operation(format!("Failed to create index writer: {e}")))?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::operation(format!("Failed to create index reader: {e}")))?;

        let published = Arc::new(RwLock::new(Arc::new(taxonomy.clone())));
        Ok(Self {
            index,
            writer,
            reader,
            documents: DocumentBuilder::new(schema, Arc::new(extractors)),
            config: config.clone(),
            taxonomy,
            published,
            data_dir,
            pending: 0,
        })
    }

    /// Stage a recipe.
    ///
    /// A recipe whose id is already indexed replaces the old document. The
    /// change is not searchable until `commit()` is called.
    pub fn add_recipe(&mut self, recipe: &Recipe) -> Result<()> {
        let doc = self.documents.build_document(recipe, &mut self.taxonomy)?;
        let id_field = self.documents.schema().recipe_id;

        self.writer
            .delete_term(Term::from_field_u64(id_field, recipe.recipe_id()));
        self.writer
            .add_document(doc)
            .map_err(|e| Error::operation(format!("Failed to add recipe: {e}")))?;
        self.pending += 1;
        Ok(())
    }

    /// Make staged recipes searchable.
    ///
    /// The taxonomy is persisted and published before the Tantivy commit, so
    /// any snapshot of the new segments finds every ordinal they use.
    pub fn commit(&mut self) -> Result<()> {
        if let Some(dir) = &self.data_dir {
            self.taxonomy.save(dir)?;
        }
        {
            let mut slot = self
                .published
                .write()
                .map_err(|_| Error::operation("Taxonomy lock poisoned"))?;
            *slot = Arc::new(self.taxonomy.clone());
        }

        self.writer
            .commit()
            .map_err(|e| Error::operation(format!("Failed to commit index: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::operation(format!("Failed to reload index reader: {e}")))?;

        if let Some(dir) = &self.data_dir {
            IndexMetadata::new(
                self.config.diets.clone(),
                self.documents.extractors().dimensions(),
                self.num_docs(),
            )
            .save(dir)?;
        }

        log::info!(
            "Committed {} recipes ({} total, {} taxonomy paths)",
            self.pending,
            self.num_docs(),
            self.taxonomy.len()
        );
        self.pending = 0;
        Ok(())
    }

    /// Merge all searchable segments into one and drop unused files.
    ///
    /// Blocks until the merge is done. Meant for preparing a read-only
    /// deployment, not for use alongside steady indexing.
    pub fn merge_segments(&mut self) -> Result<()> {
        if self.pending > 0 {
            self.commit()?;
        }

        let segment_ids = self
            .index
            .searchable_segment_ids()
            .map_err(|e| Error::operation(format!("Failed to list segments: {e}")))?;
        if segment_ids.len() > 1 {
            self.writer
                .merge(&segment_ids)
                .wait()
                .map_err(|e| Error::operation(format!("Failed to merge segments: {e}")))?;
            log::info!("Merged {} segments", segment_ids.len());
        }

        self.writer
            .garbage_collect_files()
            .wait()
            .map_err(|e| Error::operation(format!("Failed to collect index files: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::operation(format!("Failed to reload index reader: {e}")))?;
        Ok(())
    }

    /// Commit pending work and wait for background merges to finish.
    pub fn close(mut self) -> Result<()> {
        self.commit()?;
        self.writer
            .wait_merging_threads()
            .map_err(|e| Error::operation(format!("Failed to finish merges: {e}")))?;
        Ok(())
    }

    /// Number of committed documents.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Number of searchable segments.
    pub fn num_segments(&self) -> usize {
        self.reader.searcher().segment_readers().len()
    }

    /// Recipes staged since the last commit.
    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// The writer's taxonomy, including uncommitted paths.
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Get the schema.
    pub fn schema(&self) -> &RecipeSchema {
        self.documents.schema()
    }

    /// Get reference to the underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// A searcher over this index that follows the indexer's commits on
    /// `reload()`.
    pub fn searcher(&self, policy: Arc<dyn SearchPolicy>) -> Result<Searcher> {
        Searcher::from_parts(
            &self.index,
            self.documents.schema().clone(),
            &self.config,
            TaxonomySource::Shared(Arc::clone(&self.published)),
            policy,
        )
    }
}

fn check_diets(schema: &RecipeSchema, config: &EngineConfig) -> Result<()> {
    let indexed: BTreeSet<&str> = schema.diets().collect();
    let configured: BTreeSet<&str> = config.diets.iter().map(String::as_str).collect();
    if indexed != configured {
        return Err(Error::config(format!(
            "Index was built for diets {indexed:?}, configuration declares {configured:?}"
        )));
    }
    Ok(())
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("index", &"<tantivy::Index>")
            .field("data_dir", &self.data_dir)
            .field("pending", &self.pending)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
