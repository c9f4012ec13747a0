//! Facet counting.
//!
//! Two collectors run over the documents matched by a search:
//!
//! - [`AssociationThresholdCollector`] counts diet labels from the packed
//!   `diet_association` fast field. A document counts toward a label only if
//!   its score for that label reaches the label's threshold. Thresholds come
//!   from the query and default to 1.0, so this has to be recomputed per
//!   query.
//! - [`category_facets`] counts the `/dimension/label` facets of the
//!   `category` field with Tantivy's `FacetCollector`.
//! - [`RangeBucketCollector`] counts the fixed [`RangeBucket`]s of the
//!   ingredient count and time fields from their `<field>_sort` fast
//!   fields. Recipes without a value count toward no bucket.
//!
//! All of them report labels by count descending, then label ascending.

use std::collections::BTreeMap;
use std::sync::Arc;

use larder_core::{FacetData, NumericField, RangeBucket};
use tantivy::collector::{Collector, FacetCollector, FacetCounts, SegmentCollector};
use tantivy::columnar::{BytesColumn, Column};
use tantivy::schema::Facet;
use tantivy::{DocId, Score, SegmentOrdinal, SegmentReader};

use crate::association;
use crate::schema::sort_field_name;
use crate::taxonomy::Taxonomy;

/// Threshold applied to labels the query does not mention.
pub const DEFAULT_THRESHOLD: f32 = 1.0;

/// Collector for threshold-gated association counts.
pub struct AssociationThresholdCollector {
    field_name: String,
    taxonomy: Arc<Taxonomy>,
    thresholds: Arc<Vec<f32>>,
}

impl AssociationThresholdCollector {
    /// Count the association field `field_name`, resolving ordinals through
    /// `taxonomy` and gating each label by `thresholds`.
    pub fn new(
        field_name: impl Into<String>,
        taxonomy: Arc<Taxonomy>,
        thresholds: &BTreeMap<String, f32>,
    ) -> Self {
        // Indexed by ordinal: the threshold of the ordinal's label.
        let per_ordinal = taxonomy
            .iter()
            .map(|(_, path)| {
                thresholds
                    .get(&path.label)
                    .copied()
                    .unwrap_or(DEFAULT_THRESHOLD)
            })
            .collect();

        Self {
            field_name: field_name.into(),
            taxonomy,
            thresholds: Arc::new(per_ordinal),
        }
    }
}

impl Collector for AssociationThresholdCollector {
    type Fruit = AssociationCounts;
    type Child = AssociationSegmentCollector;

    fn for_segment(
        &self,
        _segment_local_id: SegmentOrdinal,
        segment: &SegmentReader,
    ) -> tantivy::Result<Self::Child> {
        let column = segment.fast_fields().bytes(&self.field_name)?;
        Ok(AssociationSegmentCollector {
            column,
            thresholds: Arc::clone(&self.thresholds),
            counts: vec![0; self.thresholds.len()],
            buffer: Vec::new(),
        })
    }

    fn requires_scoring(&self) -> bool {
        false
    }

    fn merge_fruits(&self, segment_fruits: Vec<Vec<u64>>) -> tantivy::Result<Self::Fruit> {
        let mut counts = vec![0; self.thresholds.len()];
        for fruit in segment_fruits {
            for (total, count) in counts.iter_mut().zip(fruit) {
                *total += count;
            }
        }
        Ok(AssociationCounts {
            counts,
            taxonomy: Arc::clone(&self.taxonomy),
        })
    }
}

/// Per-segment half of [`AssociationThresholdCollector`].
pub struct AssociationSegmentCollector {
    column: Option<BytesColumn>,
    thresholds: Arc<Vec<f32>>,
    counts: Vec<u64>,
    buffer: Vec<u8>,
}

impl SegmentCollector for AssociationSegmentCollector {
    type Fruit = Vec<u64>;

    fn collect(&mut self, doc: DocId, _score: Score) {
        // Segments where no document has associations have no column.
        let Some(column) = &self.column else {
            return;
        };

        for term_ord in column.term_ords(doc) {
            self.buffer.clear();
            if !matches!(column.ord_to_bytes(term_ord, &mut self.buffer), Ok(true)) {
                continue;
            }
            for (ordinal, value) in association::decode(&self.buffer) {
                let ordinal = ordinal as usize;
                // Ordinals newer than the taxonomy snapshot are skipped.
                let Some(threshold) = self.thresholds.get(ordinal) else {
                    continue;
                };
                if value >= *threshold
                    && let Some(count) = self.counts.get_mut(ordinal)
                {
                    *count += 1;
                }
            }
        }
    }

    fn harvest(self) -> Self::Fruit {
        self.counts
    }
}

/// Gated counts per taxonomy ordinal.
#[derive(Debug, Clone)]
pub struct AssociationCounts {
    counts: Vec<u64>,
    taxonomy: Arc<Taxonomy>,
}

impl AssociationCounts {
    /// Count of `(dimension, label)`, zero when unknown.
    pub fn count(&self, dimension: &str, label: &str) -> u64 {
        self.taxonomy
            .ordinal(dimension, label)
            .and_then(|ord| self.counts.get(ord as usize))
            .copied()
            .unwrap_or(0)
    }

    /// The `n` labels of `dimension` with the highest counts.
    ///
    /// Returns `None` when no label of the dimension has a positive count.
    pub fn top_children(&self, n: usize, dimension: &str) -> Option<FacetData> {
        let counts = self
            .taxonomy
            .iter()
            .filter(|(_, path)| path.dimension == dimension)
            .map(|(ord, path)| {
                let count = self.counts.get(ord as usize).copied().unwrap_or(0);
                (path.label.clone(), count)
            });

        let data = FacetData::from_counts(dimension, counts, n);
        (!data.is_empty()).then_some(data)
    }
}

/// Build a collector counting the labels of every dimension in `dimensions`.
pub fn category_collector<'a, I>(field_name: &str, dimensions: I) -> FacetCollector
where
    I: IntoIterator<Item = &'a str>,
{
    let mut collector = FacetCollector::for_field(field_name);
    for dimension in dimensions {
        collector.add_facet(Facet::from_path([dimension]));
    }
    collector
}

/// Top `n` labels per dimension from category facet counts.
///
/// Dimensions without a positive count are left out.
pub fn category_facets<'a, I>(
    counts: &FacetCounts,
    dimensions: I,
    n: usize,
) -> BTreeMap<String, FacetData>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut facets = BTreeMap::new();
    for dimension in dimensions {
        let children = counts
            .get(Facet::from_path([dimension]))
            .filter_map(|(facet, count)| {
                facet
                    .to_path()
                    .last()
                    .map(|label| (label.to_string(), count))
            });

        let data = FacetData::from_counts(dimension, children, n);
        if !data.is_empty() {
            facets.insert(dimension.to_string(), data);
        }
    }
    facets
}

/// Collector for numeric range buckets.
pub struct RangeBucketCollector {
    fields: Vec<NumericField>,
}

impl RangeBucketCollector {
    /// Count the buckets of every field in `fields`.
    pub fn new(fields: impl IntoIterator<Item = NumericField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    fn empty_counts(&self) -> Vec<Vec<u64>> {
        self.fields
            .iter()
            .map(|field| vec![0; RangeBucket::for_field(*field).len()])
            .collect()
    }
}

impl Default for RangeBucketCollector {
    fn default() -> Self {
        Self::new(RangeBucket::FIELDS)
    }
}

impl Collector for RangeBucketCollector {
    type Fruit = RangeCounts;
    type Child = RangeSegmentCollector;

    fn for_segment(
        &self,
        _segment_local_id: SegmentOrdinal,
        segment: &SegmentReader,
    ) -> tantivy::Result<Self::Child> {
        let columns = self
            .fields
            .iter()
            .map(|field| {
                let column = segment.fast_fields().u64(&sort_field_name(*field)).ok();
                (column, RangeBucket::for_field(*field))
            })
            .collect();
        Ok(RangeSegmentCollector {
            columns,
            counts: self.empty_counts(),
        })
    }

    fn requires_scoring(&self) -> bool {
        false
    }

    fn merge_fruits(&self, segment_fruits: Vec<Vec<Vec<u64>>>) -> tantivy::Result<Self::Fruit> {
        let mut counts = self.empty_counts();
        for fruit in segment_fruits {
            for (totals, segment) in counts.iter_mut().zip(fruit) {
                for (total, count) in totals.iter_mut().zip(segment) {
                    *total += count;
                }
            }
        }
        Ok(RangeCounts {
            fields: self.fields.clone(),
            counts,
        })
    }
}

/// Per-segment half of [`RangeBucketCollector`].
pub struct RangeSegmentCollector {
    columns: Vec<(Option<Column<u64>>, &'static [RangeBucket])>,
    counts: Vec<Vec<u64>>,
}

impl SegmentCollector for RangeSegmentCollector {
    type Fruit = Vec<Vec<u64>>;

    fn collect(&mut self, doc: DocId, _score: Score) {
        for ((column, buckets), counts) in self.columns.iter().zip(self.counts.iter_mut()) {
            let Some(value) = column.as_ref().and_then(|c| c.first(doc)) else {
                continue;
            };
            for (bucket, count) in buckets.iter().zip(counts.iter_mut()) {
                if bucket.contains(value) {
                    *count += 1;
                }
            }
        }
    }

    fn harvest(self) -> Self::Fruit {
        self.counts
    }
}

/// Bucket counts per numeric field.
#[derive(Debug, Clone)]
pub struct RangeCounts {
    fields: Vec<NumericField>,
    counts: Vec<Vec<u64>>,
}

impl RangeCounts {
    /// Count of the bucket `label` of `field`, zero when unknown.
    pub fn count(&self, field: NumericField, label: &str) -> u64 {
        self.buckets(field)
            .find(|(bucket, _)| bucket.label == label)
            .map_or(0, |(_, count)| count)
    }

    /// The `n` buckets of `field` with the highest counts, reported under
    /// the field's name.
    ///
    /// Returns `None` when no bucket has a positive count.
    pub fn top_children(&self, n: usize, field: NumericField) -> Option<FacetData> {
        let counts = self
            .buckets(field)
            .map(|(bucket, count)| (bucket.label.to_string(), count));
        let data = FacetData::from_counts(field.name(), counts, n);
        (!data.is_empty()).then_some(data)
    }

    /// Top `n` buckets of every counted field, keyed by dimension.
    pub fn facets(&self, n: usize) -> BTreeMap<String, FacetData> {
        self.fields
            .iter()
            .filter_map(|field| self.top_children(n, *field))
            .map(|data| (data.dimension.clone(), data))
            .collect()
    }

    fn buckets(&self, field: NumericField) -> impl Iterator<Item = (&'static RangeBucket, u64)> + '_ {
        let counts = self
            .fields
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.counts.get(i));
        RangeBucket::for_field(field)
            .iter()
            .zip(counts.into_iter().flatten().copied())
    }
}

// ============================================================================
// Tests
// ============================================================================
