use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Shelf dashboard.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A JSON document parsed but did not have the expected shape.
    #[error("Unexpected JSON layout: {0}")]
    JsonLayout(String),

    /// The remote sheet could not be reached.
    #[error("Failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    /// The remote sheet answered with a non-success status code.
    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A completion date could not be parsed under the day-first convention.
    ///
    /// `row` is 1-based and counts data rows only: the header and blank
    /// lines skipped by the CSV reader are not rows.
    #[error("Invalid completion date {value:?} in row {row}")]
    DateParse { row: usize, value: String },

    /// A required column is absent from the source table.
    #[error("Missing column for {field} (available: {})", available.join(", "))]
    MissingColumn {
        field: &'static str,
        available: Vec<String>,
    },

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the shelf crates.
pub type Result<T> = std::result::Result<T, ShelfError>;
