/// Error types for loading track and temperature data
use thiserror::Error;

/// Main error type for dataset loading.
///
/// Only structural problems are errors. Individual rows that fail to parse
/// are dropped and counted in the [`LoadReport`](crate::dataset::LoadReport).
#[derive(Error, Debug)]
pub enum TrackError {
    /// Failed to read CSV framing or headers
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to read a source
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is absent from a source header
    #[error("Source {source_label} has no column for required field {field}")]
    MissingColumn { source_label: String, field: &'static str },

    /// Invalid loader or aggregation configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Type alias for Results using TrackError
pub type Result<T> = std::result::Result<T, TrackError>;
