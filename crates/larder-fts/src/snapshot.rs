//! Immutable, versioned views of the index.
//!
//! An [`IndexSnapshot`] pairs a Tantivy `Searcher` with the taxonomy that
//! was published together with it. A query holds one snapshot for its whole
//! duration; [`SnapshotHandle`] swaps in a newer one atomically.

use std::sync::{Arc, RwLock};

use larder_core::{Error, Result};
use tantivy::collector::TopDocs;
use tantivy::query::TermQuery;
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{DocAddress, TantivyDocument, Term};

use crate::taxonomy::Taxonomy;

/// A point-in-time view of the index and its taxonomy.
#[derive(Clone)]
pub struct IndexSnapshot {
    version: u64,
    searcher: tantivy::Searcher,
    taxonomy: Arc<Taxonomy>,
    recipe_id: Field,
}

impl IndexSnapshot {
    pub(crate) fn new(
        version: u64,
        searcher: tantivy::Searcher,
        taxonomy: Arc<Taxonomy>,
        recipe_id: Field,
    ) -> Self {
        Self {
            version,
            searcher,
            taxonomy,
            recipe_id,
        }
    }

    /// Monotonic version; each reload produces a higher one.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The Tantivy searcher.
    pub fn searcher(&self) -> &tantivy::Searcher {
        &self.searcher
    }

    /// The taxonomy published with this snapshot.
    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Number of documents visible in this snapshot.
    pub fn num_docs(&self) -> u64 {
        self.searcher.num_docs()
    }

    /// `wanted` capped at the document count, and never below 1.
    pub fn hit_limit(&self, wanted: usize) -> usize {
        let docs = usize::try_from(self.num_docs()).unwrap_or(usize::MAX);
        wanted.min(docs.max(1))
    }

    /// Address of the document indexed under `recipe_id`, if any.
    pub fn find_doc(&self, recipe_id: u64) -> Result<Option<DocAddress>> {
        let query = TermQuery::new(
            Term::from_field_u64(self.recipe_id, recipe_id),
            IndexRecordOption::Basic,
        );
        let top = self
            .searcher
            .search(&query, &TopDocs::with_limit(1).order_by_score())
            .map_err(|e| Error::operation(format!("Recipe lookup failed: {e}")))?;
        Ok(top.first().map(|(_, addr)| *addr))
    }

    /// Stored recipe id of a document.
    pub fn recipe_id(&self, addr: DocAddress) -> Result<u64> {
        let doc: TantivyDocument = self
            .searcher
            .doc(addr)
            .map_err(|e| Error::operation(format!("Failed to load document: {e}")))?;
        doc.get_first(self.recipe_id)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| Error::operation(format!("Document {addr:?} has no recipe id")))
    }
}

impl std::fmt::Debug for IndexSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSnapshot")
            .field("version", &self.version)
            .field("num_docs", &self.num_docs())
            .field("taxonomy_len", &self.taxonomy.len())
            .finish()
    }
}

/// Shared slot holding the current snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    current: Arc<RwLock<Arc<IndexSnapshot>>>,
}

impl SnapshotHandle {
    /// Create a handle holding `snapshot`.
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The current snapshot.
    pub fn load(&self) -> Result<Arc<IndexSnapshot>> {
        let guard = self
            .current
            .read()
            .map_err(|_| Error::operation("Snapshot lock poisoned"))?;
        Ok(Arc::clone(&guard))
    }

    /// Replace the current snapshot unless it is newer than `snapshot`.
    pub fn publish(&self, snapshot: IndexSnapshot) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| Error::operation("Snapshot lock poisoned"))?;
        if snapshot.version >= guard.version {
            *guard = Arc::new(snapshot);
        }
        Ok(())
    }
}
