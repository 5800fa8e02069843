//! Error types for the txn-dashboard library.
//!
//! This module provides custom error types using `thiserror` for the loader,
//! the aggregation engine and the export writer.

use thiserror::Error;

/// Errors that can occur in the txn-dashboard library.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The transaction file is missing, malformed or holds unusable values
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// A filter named a category or location outside the known set
    #[error("Invalid filter value: {0}")]
    FilterValue(String),

    /// An aggregation step could not produce a finite result
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Result with `DashboardError`
pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    /// Short, stable name of the error kind, used as a metrics label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DataLoad(_) => "data_load",
            Self::FilterValue(_) => "filter_value",
            Self::Aggregation(_) => "aggregation",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
            Self::Serialization(_) => "serialization",
        }
    }
}
