//! Category extraction.
//!
//! Category dimensions are not hardcoded: the caller registers one extractor
//! per dimension when constructing the indexer, and each extractor turns a
//! recipe into zero or more labels for its dimension.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use larder_core::Recipe;
//! use larder_fts::CategoryExtractors;
//!
//! let extractors = CategoryExtractors::new()
//!     .add_category("keyword", true, |r: &Recipe| r.keywords().clone())
//!     .unwrap()
//!     .add_category("size", false, |r: &Recipe| {
//!         let label = if r.num_ingredients() > 8 { "long" } else { "short" };
//!         BTreeSet::from([label.to_string()])
//!     })
//!     .unwrap();
//!
//! assert_eq!(extractors.len(), 2);
//! ```

use std::collections::BTreeSet;

use larder_core::{Error, RangeBucket, Recipe, Result};
use serde::{Deserialize, Serialize};

use crate::schema::DIET_DIMENSION;

/// Trait for turning a recipe into labels of one category dimension.
///
/// Implemented for any `Fn(&Recipe) -> BTreeSet<String>`.
pub trait CategoryExtractor: Send + Sync {
    /// Labels for the recipe; may be empty.
    fn extract(&self, recipe: &Recipe) -> BTreeSet<String>;
}

impl<F> CategoryExtractor for F
where
    F: Fn(&Recipe) -> BTreeSet<String> + Send + Sync,
{
    fn extract(&self, recipe: &Recipe) -> BTreeSet<String> {
        self(recipe)
    }
}

/// Name and cardinality of a category dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConfig {
    /// Dimension name.
    pub name: String,
    /// Whether a recipe may carry several labels.
    pub multi_valued: bool,
}

struct Dimension {
    config: DimensionConfig,
    extractor: Box<dyn CategoryExtractor>,
}

/// Labels extracted for one dimension of one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCategory<'a> {
    /// Dimension name.
    pub dimension: &'a str,
    /// Non-empty labels.
    pub labels: BTreeSet<String>,
}

/// The set of category dimensions an indexer populates.
#[derive(Default)]
pub struct CategoryExtractors {
    dimensions: Vec<Dimension>,
}

impl CategoryExtractors {
    /// No dimensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension.
    ///
    /// Fails on an empty name, a name already registered, the reserved
    /// `diet` dimension, or the name of a range facet.
    pub fn add_category<E>(mut self, name: &str, multi_valued: bool, extractor: E) -> Result<Self>
    where
        E: CategoryExtractor + 'static,
    {
        if name.is_empty() {
            return Err(Error::config("category dimension names must be non-empty"));
        }
        if name == DIET_DIMENSION {
            return Err(Error::config(format!(
                "`{DIET_DIMENSION}` is reserved for diet associations"
            )));
        }
        if RangeBucket::field_for_dimension(name).is_some() {
            return Err(Error::config(format!(
                "`{name}` is reserved for range facets"
            )));
        }
        if self.dimensions.iter().any(|d| d.config.name == name) {
            return Err(Error::config(format!(
                "category dimension `{name}` registered twice"
            )));
        }

        self.dimensions.push(Dimension {
            config: DimensionConfig {
                name: name.to_string(),
                multi_valued,
            },
            extractor: Box::new(extractor),
        });
        Ok(self)
    }

    /// Registered dimensions, in registration order.
    pub fn dimensions(&self) -> Vec<DimensionConfig> {
        self.dimensions.iter().map(|d| d.config.clone()).collect()
    }

    /// Number of registered dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether no dimension is registered.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Run every extractor once on the recipe.
    ///
    /// Empty labels are dropped. A single-valued dimension producing more
    /// than one label is an error for the whole recipe.
    pub fn extract<'a>(&'a self, recipe: &Recipe) -> Result<Vec<ExtractedCategory<'a>>> {
        let mut extracted = Vec::with_capacity(self.dimensions.len());
        for dimension in &self.dimensions {
            let mut labels = dimension.extractor.extract(recipe);
            labels.retain(|label| !label.is_empty());

            if !dimension.config.multi_valued && labels.len() > 1 {
                return Err(Error::validation(
                    dimension.config.name.as_str(),
                    format!(
                        "single-valued dimension produced {} labels for recipe {}",
                        labels.len(),
                        recipe.recipe_id()
                    ),
                ));
            }
            if !labels.is_empty() {
                extracted.push(ExtractedCategory {
                    dimension: &dimension.config.name,
                    labels,
                });
            }
        }
        Ok(extracted)
    }
}

impl std::fmt::Debug for CategoryExtractors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryExtractors")
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
