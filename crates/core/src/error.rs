//! Error types for the tick resampler.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tick resampler.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input table held no trade events.
    #[error("Empty input: no trade events to resample")]
    EmptyInput,

    /// A field in the input table could not be parsed.
    #[error("Parse error at row {row}: {message}")]
    Parse {
        /// 1-based data row (header excluded).
        row: u64,
        message: String,
    },

    /// Required columns are missing from the input table.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The first boundary of the series has no bucket, so there is nothing to carry forward.
    #[error("First boundary {0} has no bucket to carry a price forward from")]
    FirstBucketMissing(i64),

    /// Data error (invalid or unrepresentable values).
    #[error("Data error: {0}")]
    Data(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error for a data row.
    pub fn parse(row: u64, msg: impl Into<String>) -> Self {
        Error::Parse {
            row,
            message: msg.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }
}
