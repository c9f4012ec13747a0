//! Recipe records accepted by the indexer.
//!
//! A [`Recipe`] is immutable once built. Construction goes through
//! [`RecipeBuilder`], which is also the deserialization target, so a recipe
//! read from JSON is held to the same invariants as one built in code.
//!
//! # Example
//!
//! ```rust
//! use larder_core::Recipe;
//!
//! let recipe = Recipe::builder()
//!     .recipe_id(1)
//!     .name("Garlic Butter Salmon")
//!     .crawl_url("https://example.com/salmon")
//!     .instructions("Sear the salmon, baste with garlic butter.")
//!     .ingredients(["salmon", "garlic", "butter"])
//!     .diet("keto", 0.9)
//!     .prep_time(10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(recipe.num_ingredients(), 3);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::NumericField;

/// A validated recipe record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RecipeBuilder")]
pub struct Recipe {
    recipe_id: u64,
    name: String,
    crawl_url: String,
    instructions: String,
    ingredients: Vec<String>,
    diets: BTreeMap<String, f32>,
    keywords: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fat_content: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    protein_content: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    carbohydrate_content: Option<u32>,
}

impl Recipe {
    /// Start building a recipe.
    pub fn builder() -> RecipeBuilder {
        RecipeBuilder::default()
    }

    /// Parse a recipe from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the recipe to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Unique, positive recipe identifier.
    pub fn recipe_id(&self) -> u64 {
        self.recipe_id
    }

    /// Recipe name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Page the recipe was crawled from.
    pub fn crawl_url(&self) -> &str {
        &self.crawl_url
    }

    /// Free-text preparation instructions.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Ingredient lines, in recipe order.
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Diet name to score in `[0, 1]`.
    pub fn diets(&self) -> &BTreeMap<String, f32> {
        &self.diets
    }

    /// Keywords attached by the crawler.
    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    /// Number of ingredient lines.
    pub fn num_ingredients(&self) -> usize {
        self.ingredients.len()
    }

    /// Preparation time in minutes.
    pub fn prep_time(&self) -> Option<u32> {
        self.prep_time
    }

    /// Cooking time in minutes.
    pub fn cook_time(&self) -> Option<u32> {
        self.cook_time
    }

    /// Total time in minutes.
    pub fn total_time(&self) -> Option<u32> {
        self.total_time
    }

    /// Calories per serving.
    pub fn calories(&self) -> Option<u32> {
        self.calories
    }

    /// Fat content in grams.
    pub fn fat_content(&self) -> Option<u32> {
        self.fat_content
    }

    /// Protein content in grams.
    pub fn protein_content(&self) -> Option<u32> {
        self.protein_content
    }

    /// Carbohydrate content in grams.
    pub fn carbohydrate_content(&self) -> Option<u32> {
        self.carbohydrate_content
    }

    /// Value of a numeric attribute, if the recipe carries it.
    ///
    /// `NumIngredients` is derived and always present.
    pub fn numeric(&self, field: NumericField) -> Option<u64> {
        let value = match field {
            NumericField::NumIngredients => return Some(self.ingredients.len() as u64),
            NumericField::PrepTime => self.prep_time,
            NumericField::CookTime => self.cook_time,
            NumericField::TotalTime => self.total_time,
            NumericField::Calories => self.calories,
            NumericField::FatContent => self.fat_content,
            NumericField::ProteinContent => self.protein_content,
            NumericField::CarbohydrateContent => self.carbohydrate_content,
        };
        value.map(u64::from)
    }

    /// Full-text values in indexing order: name, instructions, ingredients.
    pub fn fulltext_values(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(std::iter::once(self.instructions.as_str()))
            .chain(self.ingredients.iter().map(String::as_str))
    }
}

/// Builder for [`Recipe`].
///
/// Also the shape recipes take on the wire (camelCase keys, as produced by
/// the crawler).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeBuilder {
    recipe_id: Option<u64>,
    name: Option<String>,
    crawl_url: Option<String>,
    instructions: Option<String>,
    ingredients: Vec<String>,
    diets: BTreeMap<String, f32>,
    keywords: BTreeSet<String>,
    prep_time: Option<u32>,
    cook_time: Option<u32>,
    total_time: Option<u32>,
    calories: Option<u32>,
    fat_content: Option<u32>,
    protein_content: Option<u32>,
    carbohydrate_content: Option<u32>,
}

impl RecipeBuilder {
    /// Set the recipe id.
    pub fn recipe_id(mut self, id: u64) -> Self {
        self.recipe_id = Some(id);
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the crawl URL.
    pub fn crawl_url(mut self, url: impl Into<String>) -> Self {
        self.crawl_url = Some(url.into());
        self
    }

    /// Set the instructions text.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Append one ingredient line.
    pub fn ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredients.push(ingredient.into());
        self
    }

    /// Append several ingredient lines.
    pub fn ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients
            .extend(ingredients.into_iter().map(Into::into));
        self
    }

    /// Set the score for a diet.
    pub fn diet(mut self, name: impl Into<String>, score: f32) -> Self {
        self.diets.insert(name.into(), score);
        self
    }

    /// Add a keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.insert(keyword.into());
        self
    }

    /// Set the preparation time.
    pub fn prep_time(mut self, minutes: u32) -> Self {
        self.prep_time = Some(minutes);
        self
    }

    /// Set the cooking time.
    pub fn cook_time(mut self, minutes: u32) -> Self {
        self.cook_time = Some(minutes);
        self
    }

    /// Set the total time.
    pub fn total_time(mut self, minutes: u32) -> Self {
        self.total_time = Some(minutes);
        self
    }

    /// Set the calories.
    pub fn calories(mut self, calories: u32) -> Self {
        self.calories = Some(calories);
        self
    }

    /// Set the fat content.
    pub fn fat_content(mut self, grams: u32) -> Self {
        self.fat_content = Some(grams);
        self
    }

    /// Set the protein content.
    pub fn protein_content(mut self, grams: u32) -> Self {
        self.protein_content = Some(grams);
        self
    }

    /// Set the carbohydrate content.
    pub fn carbohydrate_content(mut self, grams: u32) -> Self {
        self.carbohydrate_content = Some(grams);
        self
    }

    /// Validate and build the recipe.
    pub fn build(self) -> Result<Recipe> {
        let recipe_id = match self.recipe_id {
            Some(id) if id > 0 => id,
            Some(_) => return Err(Error::validation("recipeId", "must be positive")),
            None => return Err(Error::validation("recipeId", "is required")),
        };
        let name = non_empty("name", self.name)?;
        let crawl_url = non_empty("crawlUrl", self.crawl_url)?;
        let instructions = non_empty("instructions", self.instructions)?;

        if self.ingredients.is_empty() {
            return Err(Error::validation("ingredients", "must have items"));
        }

        for (diet, score) in &self.diets {
            if !score.is_finite() || *score < 0.0 || *score > 1.0 {
                return Err(Error::validation(
                    "diets",
                    format!("score for diet `{diet}` ({score}) should be in [0,1]"),
                ));
            }
        }

        Ok(Recipe {
            recipe_id,
            name,
            crawl_url,
            instructions,
            ingredients: self.ingredients,
            diets: self.diets,
            keywords: self.keywords,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            total_time: self.total_time,
            calories: self.calories,
            fat_content: self.fat_content,
            protein_content: self.protein_content,
            carbohydrate_content: self.carbohydrate_content,
        })
    }
}

impl TryFrom<RecipeBuilder> for Recipe {
    type Error = Error;

    fn try_from(builder: RecipeBuilder) -> Result<Self> {
        builder.build()
    }
}

fn non_empty(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::validation(field, "can't be empty")),
    }
}

// ============================================================================
// Tests
// ============================================================================
