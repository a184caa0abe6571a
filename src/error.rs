// Error taxonomy for the resolution engine
// Query outcomes are expected and user-facing; load failures are fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Distinguishable outcomes of a query that did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No municipality matched (normal outcome, not logged as an error)
    #[error("Comune non trovato per: {query}")]
    NotFound { query: String },

    /// Autocomplete input shorter than the minimum
    #[error("Query must be at least {min} characters, got '{query}'")]
    QueryTooShort { query: String, min: usize },
}

/// Failures of the load phase. Any of these prevents the engine from serving.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Reference table '{table}' not found (looked in {candidates:?})")]
    MissingTable {
        table: &'static str,
        candidates: Vec<PathBuf>,
    },

    #[error("Reference table '{table}' is malformed ({path}): {source}")]
    Malformed {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Reference data integrity violation: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
