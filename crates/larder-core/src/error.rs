//! Error types for larder-core

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for Larder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a recipe index.
///
/// Variants are grouped by how callers are expected to react: configuration
/// errors abort construction, validation errors reject a single input,
/// rejections are policy vetoes, and the rest are execution failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid engine or index configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A value object failed one of its invariants.
    #[error("Validation error on `{field}`: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// What went wrong
        message: String,
    },

    /// The search policy vetoed the query before execution.
    #[error("Query rejected: {message}")]
    QueryRejected {
        /// Reason given by the policy
        message: String,
    },

    /// A required input could not be found.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing resource
        what: String,
    },

    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific path.
    #[error("I/O error on {path}: {source}")]
    IoWithPath {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure inside the index engine.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new validation error for the given field.
    pub fn validation<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new policy rejection.
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Error::QueryRejected {
            message: message.into(),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Error::NotFound { what: what.into() }
    }

    /// Creates a new engine operation error.
    pub fn operation<S: Into<String>>(message: S) -> Self {
        Error::Operation(message.into())
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns whether this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    /// Returns whether this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns whether the search policy rejected the query.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::QueryRejected { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
