//! Error types for dwtimer.

use thiserror::Error;

/// Errors surfaced by dwtimer operations.
#[derive(Debug, Error)]
pub enum DwtimerError {
    /// The session database could not be opened, migrated, written or read.
    ///
    /// When this comes back from a session write the record was not saved.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration or data directory problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The hotkey listener could not be started or died.
    #[error("Hotkey listener error: {0}")]
    Hotkey(String),

    /// User-supplied input was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O failure on the terminal or filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for DwtimerError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
