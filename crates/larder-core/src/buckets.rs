//! Range buckets for numeric facets.
//!
//! Ingredient counts and the three time fields are also reported as facet
//! dimensions named after the field (`num_ingredients`, `prep_time`, ...),
//! whose labels name a fixed range. Both ends of a range are inclusive and
//! the time buckets share their boundaries, so a 15 minute recipe counts
//! toward both `0-15` and `15-30`.
//!
//! A drill-down on one of these dimensions filters on the bucket's range.
//!
//! ```rust
//! use larder_core::{NumericField, RangeBucket};
//!
//! let bucket = RangeBucket::find("prep_time", "15-30").unwrap();
//! assert_eq!(bucket.field, NumericField::PrepTime);
//! assert!(bucket.contains(15) && bucket.contains(30));
//! assert!(RangeBucket::find("prep_time", "5-10").is_none());
//! ```

use crate::query::NumericField;

/// Upper bound of the open-ended buckets.
const OPEN_END: u64 = u32::MAX as u64;

/// One labelled, inclusive range of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBucket {
    /// Field the range applies to.
    pub field: NumericField,
    /// Facet label.
    pub label: &'static str,
    /// Lower bound, inclusive.
    pub start: u64,
    /// Upper bound, inclusive.
    pub end: u64,
}

const fn bucket(field: NumericField, label: &'static str, start: u64, end: u64) -> RangeBucket {
    RangeBucket {
        field,
        label,
        start,
        end,
    }
}

const NUM_INGREDIENTS: [RangeBucket; 3] = [
    bucket(NumericField::NumIngredients, "1-4", 1, 4),
    bucket(NumericField::NumIngredients, "5-10", 5, 10),
    bucket(NumericField::NumIngredients, "11+", 11, OPEN_END),
];

const fn time_buckets(field: NumericField) -> [RangeBucket; 4] {
    [
        bucket(field, "0-15", 0, 15),
        bucket(field, "15-30", 15, 30),
        bucket(field, "30-60", 30, 60),
        bucket(field, "60+", 60, OPEN_END),
    ]
}

const PREP_TIME: [RangeBucket; 4] = time_buckets(NumericField::PrepTime);
const COOK_TIME: [RangeBucket; 4] = time_buckets(NumericField::CookTime);
const TOTAL_TIME: [RangeBucket; 4] = time_buckets(NumericField::TotalTime);

impl RangeBucket {
    /// Fields reported as range facets.
    pub const FIELDS: [NumericField; 4] = [
        NumericField::NumIngredients,
        NumericField::PrepTime,
        NumericField::CookTime,
        NumericField::TotalTime,
    ];

    /// Buckets of `field`; empty for fields without range facets.
    pub fn for_field(field: NumericField) -> &'static [RangeBucket] {
        match field {
            NumericField::NumIngredients => &NUM_INGREDIENTS,
            NumericField::PrepTime => &PREP_TIME,
            NumericField::CookTime => &COOK_TIME,
            NumericField::TotalTime => &TOTAL_TIME,
            _ => &[],
        }
    }

    /// The field whose range facets use `dimension` as their name.
    pub fn field_for_dimension(dimension: &str) -> Option<NumericField> {
        Self::FIELDS.into_iter().find(|f| f.name() == dimension)
    }

    /// The bucket labelled `label` in range dimension `dimension`.
    pub fn find(dimension: &str, label: &str) -> Option<RangeBucket> {
        let field = Self::field_for_dimension(dimension)?;
        Self::for_field(field)
            .iter()
            .find(|b| b.label == label)
            .copied()
    }

    /// Whether `value` falls within the bucket.
    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }
}

// ============================================================================
// Tests
// ============================================================================
