use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the solar dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// An input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected the file (bad quoting, uneven rows, bad UTF-8).
    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A configured column is absent from the file's header row.
    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A timestamp cell did not match any recognised format.
    #[error("Invalid timestamp '{value}' in {path} at line {line}")]
    TimestampParse {
        path: PathBuf,
        line: u64,
        value: String,
    },

    /// A measurement cell is neither blank nor a number.
    #[error("Invalid value '{value}' for column '{column}' in {path} at line {line}")]
    ValueParse {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    /// The retention window's lower bound lies after its upper bound.
    #[error("Invalid year range: {min} is after {max}")]
    InvalidYearRange { min: i32, max: i32 },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
