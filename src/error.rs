//! Error types for Cohort Flux

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors that can occur during a metrics run
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse observation records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Missing {metric} index entry for individual {individual} at time {time}")]
    MissingIndexEntry {
        metric: &'static str,
        individual: String,
        time: String,
    },

    #[error("Metric column {column} has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Metric column {column} does not hold counts")]
    ColumnTypeMismatch { column: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
