//! Tantivy schema for recipe documents.
//!
//! # Schema Fields
//!
//! ## Identity
//! - `recipe_id`: u64 (INDEXED | STORED), id lookup and result assembly
//!
//! ## Full text
//! - `fulltext`: TEXT with positions, STORED; name, instructions and every
//!   ingredient line as separate values
//! - `keyword`: STRING, exact keyword matching
//!
//! ## Numeric attributes
//! Every [`NumericField`] gets two physical fields:
//! - `<name>`: u64 (INDEXED), inclusive range filters
//! - `<name>_sort`: u64 (FAST), sorting
//!
//! ## Diets
//! - `diet_<name>`: f64 (INDEXED) per declared diet, threshold filters
//! - `diet_association`: bytes (FAST), packed `(ordinal, score)` pairs read
//!   by the threshold facet collector
//!
//! ## Categories
//! - `category`: facet field holding `/<dimension>/<label>`
//!
//! # Tokenizer
//!
//! Full-text fields use the `recipe_en` analyzer:
//! SimpleTokenizer → RemoveLongFilter(40) → LowerCaser → StopWordFilter →
//! Stemmer(English)

use std::collections::BTreeMap;

use larder_core::{Error, NumericField, Result};
use tantivy::Index;
use tantivy::schema::{
    FAST, FacetOptions, Field, FieldType, INDEXED, IndexRecordOption, STORED, STRING, Schema,
    SchemaBuilder, TextFieldIndexing, TextOptions,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer,
};

use crate::stopwords::StopwordList;
use crate::types::EngineConfig;

/// Schema version for cache invalidation.
///
/// Increment this when schema fields change to force index rebuilds.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the full-text analyzer.
pub const RECIPE_TOKENIZER: &str = "recipe_en";

/// Facet dimension under which diet associations are reported.
pub const DIET_DIMENSION: &str = "diet";

/// Prefix of per-diet filter fields.
pub const DIET_FIELD_PREFIX: &str = "diet_";

const RECIPE_ID_FIELD: &str = "recipe_id";
const FULLTEXT_FIELD: &str = "fulltext";
const KEYWORD_FIELD: &str = "keyword";
pub(crate) const CATEGORY_FIELD: &str = "category";
pub(crate) const DIET_ASSOCIATION_FIELD: &str = "diet_association";
const SORT_SUFFIX: &str = "_sort";

/// Tokens longer than this are dropped by the analyzer.
const MAX_TOKEN_LENGTH: usize = 40;

/// The filter and sort fields backing one numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFields {
    /// INDEXED u64, for range filters.
    pub filter: Field,
    /// FAST u64, for sorting.
    pub sort: Field,
}

/// Recipe schema holding field references and the Tantivy schema.
#[derive(Clone)]
pub struct RecipeSchema {
    schema: Schema,

    /// Recipe identifier.
    pub recipe_id: Field,
    /// Analyzed text: name, instructions, ingredients.
    pub fulltext: Field,
    /// Raw keywords.
    pub keyword: Field,
    /// Category facets.
    pub category: Field,
    /// Packed diet associations.
    pub diet_association: Field,

    numeric: BTreeMap<NumericField, NumericFields>,
    diets: BTreeMap<String, Field>,
}

impl RecipeSchema {
    /// Build the schema for the given diets.
    pub fn build<I, S>(diets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = SchemaBuilder::new();

        // Full-text options with positions (for phrase queries)
        let text_options = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(RECIPE_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();

        let recipe_id = builder.add_u64_field(RECIPE_ID_FIELD, INDEXED | STORED);
        let fulltext = builder.add_text_field(FULLTEXT_FIELD, text_options);
        let keyword = builder.add_text_field(KEYWORD_FIELD, STRING);
        let category = builder.add_facet_field(CATEGORY_FIELD, FacetOptions::default());
        let diet_association = builder.add_bytes_field(DIET_ASSOCIATION_FIELD, FAST);

        let mut numeric = BTreeMap::new();
        for field in NumericField::ALL {
            let filter = builder.add_u64_field(field.name(), INDEXED);
            let sort = builder.add_u64_field(&sort_field_name(field), FAST);
            numeric.insert(field, NumericFields { filter, sort });
        }

        let mut diet_fields = BTreeMap::new();
        for diet in diets {
            let diet = diet.as_ref();
            if diet.is_empty() {
                return Err(Error::config("diet names must be non-empty"));
            }
            if diet_fields.contains_key(diet) {
                return Err(Error::config(format!("diet `{diet}` declared twice")));
            }
            let field = builder.add_f64_field(&diet_field_name(diet), INDEXED);
            diet_fields.insert(diet.to_string(), field);
        }

        Ok(Self {
            schema: builder.build(),
            recipe_id,
            fulltext,
            keyword,
            category,
            diet_association,
            numeric,
            diets: diet_fields,
        })
    }

    /// Resolve field handles from the schema of an existing index.
    ///
    /// Diets are discovered from the `diet_<name>` f64 fields.
    pub fn from_schema(schema: Schema) -> Result<Self> {
        let lookup = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| Error::config(format!("Index schema is missing `{name}`: {e}")))
        };

        let recipe_id = lookup(RECIPE_ID_FIELD)?;
        let fulltext = lookup(FULLTEXT_FIELD)?;
        let keyword = lookup(KEYWORD_FIELD)?;
        let category = lookup(CATEGORY_FIELD)?;
        let diet_association = lookup(DIET_ASSOCIATION_FIELD)?;

        let mut numeric = BTreeMap::new();
        for field in NumericField::ALL {
            let filter = lookup(field.name())?;
            let sort = lookup(&sort_field_name(field))?;
            numeric.insert(field, NumericFields { filter, sort });
        }

        let diets = schema
            .fields()
            .filter(|(_, entry)| matches!(entry.field_type(), FieldType::F64(_)))
            .filter_map(|(field, entry)| {
                entry
                    .name()
                    .strip_prefix(DIET_FIELD_PREFIX)
                    .map(|diet| (diet.to_string(), field))
            })
            .collect();

        Ok(Self {
            schema,
            recipe_id,
            fulltext,
            keyword,
            category,
            diet_association,
            numeric,
            diets,
        })
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Register the recipe analyzer with a Tantivy index.
    ///
    /// Must be called after creating/opening an index, with the same
    /// configuration the documents were indexed with.
    pub fn register_tokenizers(index: &Index, config: &EngineConfig) {
        index
            .tokenizers()
            .register(RECIPE_TOKENIZER, recipe_analyzer(config));
    }

    /// Filter and sort fields for a numeric attribute.
    pub fn numeric(&self, field: NumericField) -> NumericFields {
        // Every variant is inserted by both constructors.
        self.numeric[&field]
    }

    /// Filter field for a diet, if declared.
    pub fn diet_field(&self, diet: &str) -> Option<Field> {
        self.diets.get(diet).copied()
    }

    /// Declared diet names, sorted.
    pub fn diets(&self) -> impl Iterator<Item = &str> {
        self.diets.keys().map(String::as_str)
    }

    /// Whether `diet` has a filter field.
    pub fn has_diet(&self, diet: &str) -> bool {
        self.diets.contains_key(diet)
    }
}

impl std::fmt::Debug for RecipeSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeSchema")
            .field("field_count", &self.schema.fields().count())
            .field("diets", &self.diets.keys().collect::<Vec<_>>())
            .field("schema_version", &SCHEMA_VERSION)
            .finish()
    }
}

/// Build the analyzer used for indexing and query terms.
pub fn recipe_analyzer(config: &EngineConfig) -> TextAnalyzer {
    let stopwords = StopwordList::new(config);
    let builder = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(LowerCaser);

    if stopwords.is_enabled() {
        builder
            .filter(StopWordFilter::remove(stopwords.words()))
            .filter(Stemmer::new(Language::English))
            .build()
    } else {
        builder.filter(Stemmer::new(Language::English)).build()
    }
}

/// Name of the INDEXED field of a diet.
pub fn diet_field_name(diet: &str) -> String {
    format!("{DIET_FIELD_PREFIX}{diet}")
}

/// Name of the FAST field used to sort on `field`.
pub fn sort_field_name(field: NumericField) -> String {
    format!("{}{SORT_SUFFIX}", field.name())
}

// ============================================================================
// Tests
// ============================================================================
