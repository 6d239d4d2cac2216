//! Error types for the harvester.
//!
//! Two tiers of failure exist in the pipeline: structural failures
//! (`MissingField`, `MultipleValues`, `EmptySelection`, `UnexpectedFormat`,
//! `DateFormat`) abort processing of the document or record that raised
//! them, while optional per-record fields degrade to `None` without ever
//! constructing an error.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum FaraError {
    /// A required singular value was absent.
    #[error("Required field '{0}' not found")]
    MissingField(String),

    /// A required singular value matched more than once.
    #[error("Field '{0}' matched multiple values")]
    MultipleValues(String),

    /// A required container query matched nothing.
    #[error("Selector for '{0}' matched nothing")]
    EmptySelection(String),

    /// A parsed string did not match its expected structural pattern.
    #[error("Unexpected format for {context}: '{value}'")]
    UnexpectedFormat { context: String, value: String },

    /// A date string failed the expected MM/DD/YYYY pattern.
    #[error("Date '{0}' does not match MM/DD/YYYY")]
    DateFormat(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts exhausted.
    #[error("All {attempts} attempts failed for {url}: {message}")]
    RetriesExhausted {
        attempts: u32,
        url: String,
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, FaraError>;
