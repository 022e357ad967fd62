//! Airport lookup error types.

use std::path::PathBuf;

/// Errors that can occur when building or querying an airport database.
#[derive(Debug, thiserror::Error)]
pub enum AirportError {
    /// No airport is known for the code
    #[error("unknown airport: {0:?}")]
    UnknownAirport(String),

    /// Failed to read the database file
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the database JSON
    #[error("JSON parse error in {path:?}: {message}")]
    Json { path: PathBuf, message: String },
}
