//! Recipe to Tantivy document conversion.
//!
//! `DocumentBuilder` maps one [`Recipe`] onto the fields of a
//! [`RecipeSchema`]. As a side effect it assigns taxonomy ordinals to every
//! `(dimension, label)` pair it encounters, diets included. All checks run
//! before the taxonomy is touched, so a rejected recipe leaves no ordinals
//! behind.

use std::sync::Arc;

use larder_core::{Error, NumericField, Recipe, Result};
use tantivy::TantivyDocument;
use tantivy::schema::Facet;

use crate::association;
use crate::extractor::CategoryExtractors;
use crate::schema::{DIET_DIMENSION, RecipeSchema};
use crate::taxonomy::Taxonomy;

/// Converts recipes into indexable documents.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    schema: RecipeSchema,
    extractors: Arc<CategoryExtractors>,
}

impl DocumentBuilder {
    /// Create a builder over a schema and a set of category extractors.
    pub fn new(schema: RecipeSchema, extractors: Arc<CategoryExtractors>) -> Self {
        Self { schema, extractors }
    }

    /// The schema documents are built for.
    pub fn schema(&self) -> &RecipeSchema {
        &self.schema
    }

    /// The category extractors run on every recipe.
    pub fn extractors(&self) -> &CategoryExtractors {
        &self.extractors
    }

    /// Build the document for `recipe`, registering ordinals in `taxonomy`.
    pub fn build_document(
        &self,
        recipe: &Recipe,
        taxonomy: &mut Taxonomy,
    ) -> Result<TantivyDocument> {
        let s = &self.schema;

        // Checks first: nothing below may fail after the taxonomy grows.
        let mut diets = Vec::new();
        for (diet, score) in recipe.diets() {
            let field = s.diet_field(diet).ok_or_else(|| {
                Error::validation(
                    "diets",
                    format!(
                        "recipe {} scores unknown diet `{diet}`",
                        recipe.recipe_id()
                    ),
                )
            })?;
            if *score > 0.0 {
                diets.push((diet.as_str(), field, *score));
            }
        }
        let categories = self.extractors.extract(recipe)?;

        let mut doc = TantivyDocument::new();

        // Identity
        doc.add_u64(s.recipe_id, recipe.recipe_id());

        // Full text
        for value in recipe.fulltext_values() {
            doc.add_text(s.fulltext, value);
        }
        for keyword in recipe.keywords() {
            doc.add_text(s.keyword, keyword);
        }

        // Numeric attributes: one filter entry and one sort entry each
        for field in NumericField::ALL {
            if let Some(value) = recipe.numeric(field) {
                let fields = s.numeric(field);
                doc.add_u64(fields.filter, value);
                doc.add_u64(fields.sort, value);
            }
        }

        // Diets: filter field plus packed association, positive scores only
        let mut pairs = Vec::with_capacity(diets.len());
        for (diet, field, score) in diets {
            doc.add_f64(field, f64::from(score));
            pairs.push((taxonomy.get_or_insert(DIET_DIMENSION, diet)?, score));
        }
        if !pairs.is_empty() {
            let encoded = association::encode(pairs);
            doc.add_bytes(s.diet_association, encoded.as_slice());
        }

        // Categories
        for category in categories {
            for label in &category.labels {
                taxonomy.get_or_insert(category.dimension, label)?;
                let facet = Facet::from_path([category.dimension, label.as_str()]);
                doc.add_facet(s.category, facet);
            }
        }

        Ok(doc)
    }
}

// ============================================================================
// Tests
// ============================================================================
