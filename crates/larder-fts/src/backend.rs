//! Async search facade.
//!
//! The engine itself is synchronous and thread-safe. `SearchBackend` gives
//! async callers a seam over it; [`BlockingSearchBackend`] runs each call on
//! Tokio's blocking pool so queries never stall the runtime's workers.
//!
//! No timeout is applied here. Callers race the returned future against
//! their own deadline and drop it when they stop caring.
//!
//! # Example
//!
//! ```rust,ignore
//! use larder_fts::{BlockingSearchBackend, SearchBackend};
//!
//! let backend = BlockingSearchBackend::new(Arc::new(searcher));
//! let result = backend.search(query).await?;
//! println!("Found {} recipes", result.total_hits());
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use larder_core::{Error, Result, SearchQuery, SearchResult};

use crate::searcher::Searcher;

/// Abstract search backend trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search query.
    async fn search(&self, query: SearchQuery) -> Result<SearchResult>;

    /// Recipes similar to free text.
    async fn find_similar_text(&self, text: String, max_results: usize) -> Result<SearchResult>;

    /// Recipes similar to an indexed recipe; empty if the id is unknown.
    async fn find_similar_recipe(&self, recipe_id: u64, max_results: usize)
    -> Result<SearchResult>;

    /// Get the backend name for diagnostics.
    fn name(&self) -> &str;

    /// Check if the backend is ready to handle queries.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Run several queries concurrently; the first error wins.
pub async fn search_all(
    backend: &dyn SearchBackend,
    queries: Vec<SearchQuery>,
) -> Result<Vec<SearchResult>> {
    try_join_all(queries.into_iter().map(|query| backend.search(query))).await
}

/// Backend running a [`Searcher`] on the blocking thread pool.
#[derive(Clone)]
pub struct BlockingSearchBackend {
    searcher: Arc<Searcher>,
}

impl BlockingSearchBackend {
    /// Wrap a searcher.
    pub fn new(searcher: Arc<Searcher>) -> Self {
        Self { searcher }
    }

    /// The wrapped searcher.
    pub fn searcher(&self) -> &Arc<Searcher> {
        &self.searcher
    }

    async fn run<F>(&self, call: F) -> Result<SearchResult>
    where
        F: FnOnce(&Searcher) -> Result<SearchResult> + Send + 'static,
    {
        let searcher = Arc::clone(&self.searcher);
        tokio::task::spawn_blocking(move || call(&searcher))
            .await
            .map_err(|e| Error::operation(format!("Search task failed: {e}")))?
    }
}

#[async_trait]
impl SearchBackend for BlockingSearchBackend {
    async fn search(&self, query: SearchQuery) -> Result<SearchResult> {
        self.run(move |searcher| searcher.search(&query)).await
    }

    async fn find_similar_text(&self, text: String, max_results: usize) -> Result<SearchResult> {
        self.run(move |searcher| searcher.find_similar_text(&text, max_results))
            .await
    }

    async fn find_similar_recipe(
        &self,
        recipe_id: u64,
        max_results: usize,
    ) -> Result<SearchResult> {
        self.run(move |searcher| searcher.find_similar_recipe(recipe_id, max_results))
            .await
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

impl std::fmt::Debug for BlockingSearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingSearchBackend")
            .field("searcher", &self.searcher)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
