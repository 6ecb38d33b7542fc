//! Error types for the diagnostics pipeline.

use thiserror::Error;

/// Errors raised when the input table or an intermediate table does not have
/// the shape an operation needs.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// A required column (monthyear, target, date, or a requested feature)
    /// is absent from the dataset.
    #[error("Column '{column}' not found in dataset. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// A count record lacks a grouping key the operation groups by.
    #[error("Record for feature '{feature}' has no {key} key; roll counts up by {key} before {operation}")]
    MissingGroupKey {
        feature: String,
        key: &'static str,
        operation: &'static str,
    },

    /// The input file extension is neither CSV nor Parquet.
    #[error("Unsupported file format: '{extension}'. Supported formats: csv, parquet")]
    UnsupportedFormat { extension: String },

    /// The same column was listed as more than one role.
    #[error("Column '{column}' cannot be used as both {first} and {second}")]
    ConflictingRole {
        column: String,
        first: &'static str,
        second: &'static str,
    },
}
