//! Structured search requests.
//!
//! A [`SearchQuery`] combines an optional full-text expression with numeric
//! range filters, diet thresholds, drill-downs, a sort order and pagination.
//! It is validated once, when built, and is immutable afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buckets::RangeBucket;
use crate::error::{Error, Result};

/// Default page size.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default number of labels returned per facet dimension.
pub const DEFAULT_MAX_FACETS: usize = 10;

/// Numeric recipe attributes that can be filtered and sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    /// Number of ingredient lines (always present).
    NumIngredients,
    /// Preparation time in minutes.
    PrepTime,
    /// Cooking time in minutes.
    CookTime,
    /// Total time in minutes.
    TotalTime,
    /// Calories per serving.
    Calories,
    /// Fat in grams.
    FatContent,
    /// Protein in grams.
    ProteinContent,
    /// Carbohydrates in grams.
    CarbohydrateContent,
}

impl NumericField {
    /// Every numeric field, in schema order.
    pub const ALL: [NumericField; 8] = [
        NumericField::NumIngredients,
        NumericField::PrepTime,
        NumericField::CookTime,
        NumericField::TotalTime,
        NumericField::Calories,
        NumericField::FatContent,
        NumericField::ProteinContent,
        NumericField::CarbohydrateContent,
    ];

    /// Index field name.
    pub fn name(self) -> &'static str {
        match self {
            NumericField::NumIngredients => "num_ingredients",
            NumericField::PrepTime => "prep_time",
            NumericField::CookTime => "cook_time",
            NumericField::TotalTime => "total_time",
            NumericField::Calories => "calories",
            NumericField::FatContent => "fat_content",
            NumericField::ProteinContent => "protein_content",
            NumericField::CarbohydrateContent => "carbohydrate_content",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    /// Engine relevance score, best first.
    #[default]
    Relevance,
    /// Fewest ingredients first.
    NumIngredients,
    /// Shortest preparation first.
    PrepTime,
    /// Shortest cooking first.
    CookTime,
    /// Shortest total time first.
    TotalTime,
    /// Fewest calories first.
    Calories,
}

impl SortOrder {
    /// The numeric field this order sorts on, or `None` for relevance.
    pub fn numeric_field(self) -> Option<NumericField> {
        match self {
            SortOrder::Relevance => None,
            SortOrder::NumIngredients => Some(NumericField::NumIngredients),
            SortOrder::PrepTime => Some(NumericField::PrepTime),
            SortOrder::CookTime => Some(NumericField::CookTime),
            SortOrder::TotalTime => Some(NumericField::TotalTime),
            SortOrder::Calories => Some(NumericField::Calories),
        }
    }
}

/// Inclusive, non-negative integer range. Serialized as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct RangedSpec {
    start: u32,
    end: u32,
}

impl RangedSpec {
    /// Create a range; `start` must not exceed `end`.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(Error::validation(
                "range",
                format!("start ({start}) must not be after end ({end})"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Lower bound, inclusive.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Upper bound, inclusive.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether `value` falls inside the range.
    pub fn contains(&self, value: u64) -> bool {
        u64::from(self.start) <= value && value <= u64::from(self.end)
    }
}

impl TryFrom<(i64, i64)> for RangedSpec {
    type Error = Error;

    fn try_from((start, end): (i64, i64)) -> Result<Self> {
        let to_u32 = |v: i64| {
            u32::try_from(v).map_err(|_| {
                Error::validation("range", format!("{v} is not a non-negative 32-bit integer"))
            })
        };
        Self::new(to_u32(start)?, to_u32(end)?)
    }
}

impl From<RangedSpec> for (i64, i64) {
    fn from(spec: RangedSpec) -> Self {
        (i64::from(spec.start), i64::from(spec.end))
    }
}

/// Restrict results to documents carrying `label` in a category dimension,
/// or to a range bucket when `dimension` names a range facet.
///
/// Serialized as `[dimension, label]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(String, String)", into = "(String, String)")]
pub struct DrillDown {
    dimension: String,
    label: String,
}

impl DrillDown {
    /// Create a drill-down; neither part may be empty, and a range
    /// dimension only accepts its bucket labels.
    pub fn new(dimension: impl Into<String>, label: impl Into<String>) -> Result<Self> {
        let dimension = dimension.into();
        let label = label.into();
        if dimension.is_empty() || label.is_empty() {
            return Err(Error::validation(
                "drillDown",
                "dimension and label must be non-empty",
            ));
        }
        if RangeBucket::field_for_dimension(&dimension).is_some()
            && RangeBucket::find(&dimension, &label).is_none()
        {
            return Err(Error::validation(
                "drillDown",
                format!("invalid label `{label}` for range `{dimension}`"),
            ));
        }
        Ok(Self { dimension, label })
    }

    /// The range bucket this drill-down selects, if it targets a range facet.
    pub fn range_bucket(&self) -> Option<RangeBucket> {
        RangeBucket::find(&self.dimension, &self.label)
    }

    /// Category dimension.
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Label within the dimension.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl TryFrom<(String, String)> for DrillDown {
    type Error = Error;

    fn try_from((dimension, label): (String, String)) -> Result<Self> {
        Self::new(dimension, label)
    }
}

impl From<DrillDown> for (String, String) {
    fn from(d: DrillDown) -> Self {
        (d.dimension, d.label)
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SearchQueryBuilder")]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    fulltext: Option<String>,
    ranges: BTreeMap<NumericField, RangedSpec>,
    diet_threshold: BTreeMap<String, f32>,
    drill_down: BTreeSet<DrillDown>,
    match_keyword: BTreeSet<String>,
    sort: SortOrder,
    max_results: usize,
    offset: usize,
    max_facets: usize,
}

impl SearchQuery {
    /// Start building a query.
    pub fn builder() -> SearchQueryBuilder {
        SearchQueryBuilder::default()
    }

    /// Parse a query from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the query to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Full-text expression, if any.
    pub fn fulltext(&self) -> Option<&str> {
        self.fulltext.as_deref()
    }

    /// Numeric range filters.
    pub fn ranges(&self) -> &BTreeMap<NumericField, RangedSpec> {
        &self.ranges
    }

    /// Diet name to minimum score, each in `(0, 1]`.
    pub fn diet_threshold(&self) -> &BTreeMap<String, f32> {
        &self.diet_threshold
    }

    /// Category drill-downs.
    pub fn drill_down(&self) -> &BTreeSet<DrillDown> {
        &self.drill_down
    }

    /// Keywords every result must carry.
    pub fn match_keyword(&self) -> &BTreeSet<String> {
        &self.match_keyword
    }

    /// Result ordering.
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Page size, at least 1.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Number of hits to skip.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Labels per facet dimension; 0 disables facet computation.
    pub fn max_facets(&self) -> usize {
        self.max_facets
    }
}

/// Builder for [`SearchQuery`], also its JSON shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQueryBuilder {
    fulltext: Option<String>,
    ranges: BTreeMap<NumericField, RangedSpec>,
    diet_threshold: BTreeMap<String, f32>,
    drill_down: BTreeSet<DrillDown>,
    match_keyword: BTreeSet<String>,
    sort: SortOrder,
    max_results: usize,
    offset: usize,
    max_facets: usize,
}

impl Default for SearchQueryBuilder {
    fn default() -> Self {
        Self {
            fulltext: None,
            ranges: BTreeMap::new(),
            diet_threshold: BTreeMap::new(),
            drill_down: BTreeSet::new(),
            match_keyword: BTreeSet::new(),
            sort: SortOrder::default(),
            max_results: DEFAULT_MAX_RESULTS,
            offset: 0,
            max_facets: DEFAULT_MAX_FACETS,
        }
    }
}

impl SearchQueryBuilder {
    /// Set the full-text expression.
    pub fn fulltext(mut self, text: impl Into<String>) -> Self {
        self.fulltext = Some(text.into());
        self
    }

    /// Add a numeric range filter, replacing any previous one on `field`.
    pub fn range(mut self, field: NumericField, spec: RangedSpec) -> Self {
        self.ranges.insert(field, spec);
        self
    }

    /// Require `diet` to score at least `threshold`.
    pub fn diet_threshold(mut self, diet: impl Into<String>, threshold: f32) -> Self {
        self.diet_threshold.insert(diet.into(), threshold);
        self
    }

    /// Require a full score for `diet`.
    pub fn match_diet(self, diet: impl Into<String>) -> Self {
        self.diet_threshold(diet, 1.0)
    }

    /// Add a drill-down.
    pub fn drill_down(mut self, drill_down: DrillDown) -> Self {
        self.drill_down.insert(drill_down);
        self
    }

    /// Require a keyword.
    pub fn match_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.match_keyword.insert(keyword.into());
        self
    }

    /// Set the sort order.
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Set the page size.
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the number of hits to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the labels per facet dimension.
    pub fn max_facets(mut self, max_facets: usize) -> Self {
        self.max_facets = max_facets;
        self
    }

    /// Validate and build the query.
    pub fn build(self) -> Result<SearchQuery> {
        if self.max_results < 1 {
            return Err(Error::validation("maxResults", "must be at least 1"));
        }

        for (diet, threshold) in &self.diet_threshold {
            if !(threshold.is_finite() && *threshold > 0.0 && *threshold <= 1.0) {
                return Err(Error::validation(
                    "dietThreshold",
                    format!("threshold for `{diet}` ({threshold}) must be in ]0,1]"),
                ));
            }
        }

        Ok(SearchQuery {
            fulltext: self.fulltext,
            ranges: self.ranges,
            diet_threshold: self.diet_threshold,
            drill_down: self.drill_down,
            match_keyword: self.match_keyword,
            sort: self.sort,
            max_results: self.max_results,
            offset: self.offset,
            max_facets: self.max_facets,
        })
    }
}

impl TryFrom<SearchQueryBuilder> for SearchQuery {
    type Error = Error;

    fn try_from(builder: SearchQueryBuilder) -> Result<Self> {
        builder.build()
    }
}

// ============================================================================
// Tests
// ============================================================================
