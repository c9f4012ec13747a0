//! Larder Core: shared errors and value objects.
//!
//! This crate defines the records that cross the engine boundary: recipes
//! going in, queries and results going out. It has no dependency on the
//! search engine itself.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`recipe`]: Validated recipe records
//! - [`query`]: Search requests, ranges, sort orders
//! - [`result`]: Search results and facet counts
//! - [`buckets`]: Range buckets for numeric facets

pub mod buckets;
pub mod error;
pub mod query;
pub mod recipe;
pub mod result;

// Re-export key types at crate root for convenience
pub use buckets::RangeBucket;
pub use error::{Error, Result};
pub use query::{DrillDown, NumericField, RangedSpec, SearchQuery, SearchQueryBuilder, SortOrder};
pub use recipe::{Recipe, RecipeBuilder};
pub use result::{FacetData, LabelCount, SearchResult};
