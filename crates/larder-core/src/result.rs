//! Search results returned to callers.
//!
//! Results carry only recipe ids; resolving an id to display data is the
//! caller's concern.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A label and its document count within one facet dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    /// Facet label.
    pub label: String,
    /// Number of matching documents counted for the label.
    pub count: u64,
}

impl LabelCount {
    /// Create a label count.
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Counts for one facet dimension, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetData {
    /// Dimension name.
    pub dimension: String,
    /// Labels ordered by count descending, then label ascending.
    pub children: Vec<LabelCount>,
}

impl FacetData {
    /// Build facet data from unordered `(label, count)` pairs.
    ///
    /// Zero counts are dropped, the rest are ordered by count descending
    /// with ties broken by label, and at most `limit` labels are kept.
    pub fn from_counts<I>(dimension: impl Into<String>, counts: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut children: Vec<LabelCount> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| LabelCount { label, count })
            .collect();

        children.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        children.truncate(limit);

        Self {
            dimension: dimension.into(),
            children,
        }
    }

    /// Count for `label`, if present.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.children
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
    }

    /// Whether no label has a positive count.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// The outcome of a search or similarity request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    total_hits: u64,
    recipe_ids: Vec<u64>,
    facets: BTreeMap<String, FacetData>,
}

impl SearchResult {
    /// Create a result; the page can never hold more ids than there are hits.
    pub fn new(
        total_hits: u64,
        recipe_ids: Vec<u64>,
        facets: BTreeMap<String, FacetData>,
    ) -> Result<Self> {
        if recipe_ids.len() as u64 > total_hits {
            return Err(Error::validation(
                "recipeIds",
                format!(
                    "page holds {} ids but total hits is {total_hits}",
                    recipe_ids.len()
                ),
            ));
        }
        Ok(Self {
            total_hits,
            recipe_ids,
            facets,
        })
    }

    /// A result with no hits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of matching documents.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Recipe ids on this page, in result order.
    pub fn recipe_ids(&self) -> &[u64] {
        &self.recipe_ids
    }

    /// Facet counts keyed by dimension.
    pub fn facets(&self) -> &BTreeMap<String, FacetData> {
        &self.facets
    }

    /// Facet counts for one dimension.
    pub fn facet(&self, dimension: &str) -> Option<&FacetData> {
        self.facets.get(dimension)
    }
}

// ============================================================================
// Tests
// ============================================================================
