//! Error types for market table loading.

use std::path::PathBuf;
use thiserror::Error;

/// Market table loading errors.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The table file could not be opened.
    #[error("Cannot open market table {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No row carried both a numeric value and a numeric area.
    #[error("No usable rows in market table ({dropped} rows dropped)")]
    NoUsableRows {
        /// Rows discarded during cleaning.
        dropped: usize,
    },

    /// Usable rows sum to a zero or negative area.
    #[error("Total usable area must be positive, got {0}")]
    NonPositiveArea(f64),
}

/// Result alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
