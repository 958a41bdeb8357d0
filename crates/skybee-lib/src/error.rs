use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the SkyBee library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Only ingestion and configuration can fail with an error. Failed queries are
/// reported as [`crate::RouteOutcome`] values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// No data directory was supplied and none could be resolved for this platform.
    #[error("failed to resolve a data directory for the airport tables")]
    DataDirUnavailable,

    /// Raised when a table file does not exist at the resolved path.
    #[error("{table} table not found at {path}")]
    TableNotFound { table: &'static str, path: PathBuf },

    /// Raised when a table header lacks one or more required columns.
    #[error("{table} table missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        table: &'static str,
        missing: Vec<String>,
    },

    /// Raised when the same airport identifier appears on more than one row.
    #[error("duplicate airport identifier: {code}")]
    DuplicateAirport { code: String },

    /// Raised when a Q-learning configuration fails validation.
    #[error("invalid q-learning configuration: {message}")]
    InvalidConfig { message: String },

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_column() {
        let error = Error::MissingColumns {
            table: "Airports",
            missing: vec!["latitude".to_string(), "longitude".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Airports table missing required columns: latitude, longitude"
        );
    }
}
