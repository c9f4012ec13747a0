//! Taxonomy: `(dimension, label)` paths to dense integer ordinals.
//!
//! Ordinals are handed out from 0 in insertion order and never reused, so a
//! published snapshot of the taxonomy can resolve every ordinal stored in the
//! segments it was published with. The taxonomy is persisted next to the
//! index as `taxonomy.json`.

use std::collections::HashMap;
use std::path::Path;

use larder_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Taxonomy filename stored in the data directory.
const TAXONOMY_FILE: &str = "taxonomy.json";

/// A two-component facet path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetPath {
    /// Dimension name, e.g. `diet`.
    pub dimension: String,
    /// Label within the dimension, e.g. `keto`.
    pub label: String,
}

impl FacetPath {
    /// Create a path.
    pub fn new(dimension: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            label: label.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TaxonomyFile {
    paths: Vec<FacetPath>,
}

/// Append-only mapping between facet paths and ordinals.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    paths: Vec<FacetPath>,
    ordinals: HashMap<FacetPath, u32>,
}

impl Taxonomy {
    /// Create an empty taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal of `(dimension, label)`, assigning the next one if unseen.
    pub fn get_or_insert(&mut self, dimension: &str, label: &str) -> Result<u32> {
        let path = FacetPath::new(dimension, label);
        if let Some(ord) = self.ordinals.get(&path) {
            return Ok(*ord);
        }

        let ord = u32::try_from(self.paths.len())
            .map_err(|_| Error::operation("Taxonomy ordinal space exhausted"))?;
        self.paths.push(path.clone());
        self.ordinals.insert(path, ord);
        Ok(ord)
    }

    /// Ordinal of `(dimension, label)`, if assigned.
    pub fn ordinal(&self, dimension: &str, label: &str) -> Option<u32> {
        self.ordinals
            .get(&FacetPath::new(dimension, label))
            .copied()
    }

    /// Path for an ordinal.
    pub fn path(&self, ordinal: u32) -> Option<&FacetPath> {
        self.paths.get(ordinal as usize)
    }

    /// Number of assigned ordinals.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no ordinal has been assigned.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// `(ordinal, path)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &FacetPath)> {
        (0u32..).zip(self.paths.iter())
    }

    /// Load the taxonomy from a data directory.
    ///
    /// A missing file yields an empty taxonomy.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(TAXONOMY_FILE);
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
        let file: TaxonomyFile = serde_json::from_str(&content)?;

        let mut taxonomy = Self::new();
        for entry in file.paths {
            let before = taxonomy.len();
            taxonomy.get_or_insert(&entry.dimension, &entry.label)?;
            if taxonomy.len() == before {
                return Err(Error::operation(format!(
                    "Taxonomy file {} repeats {}/{}",
                    path.display(),
                    entry.dimension,
                    entry.label
                )));
            }
        }

        log::debug!("Loaded taxonomy with {} ordinals", taxonomy.len());
        Ok(taxonomy)
    }

    /// Save the taxonomy to a data directory.
    ///
    /// Writes to a temporary file first and renames it into place.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(TAXONOMY_FILE);
        let tmp = data_dir.join(format!("{TAXONOMY_FILE}.tmp"));

        let file = TaxonomyFile {
            paths: self.paths.clone(),
        };
        let content = serde_json::to_string(&file)?;

        std::fs::write(&tmp, content).map_err(|e| Error::io_with_path(e, &tmp))?;
        std::fs::rename(&tmp, &path).map_err(|e| Error::io_with_path(e, &path))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
