//! Error kinds surfaced by the table, its data sources and the export helper.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableError>;

/// Everything that can go wrong while loading, rendering or exporting the table.
///
/// Library errors are flattened to strings so the error can travel through
/// the reducer (`Clone + PartialEq`) and be shown on screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The table has not been drawn yet, so there is nothing to export.
    #[error("render target is not mounted yet")]
    RenderTargetMissing,

    /// The data source answered, but with a failure.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// Rows-per-page value outside the allow-list.
    #[error("{0} is not an allowed rows-per-page value")]
    InvalidRowsPerPage(usize),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("invalid table name: {0}")]
    InvalidTable(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TableError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TableError::Json(err.to_string())
        } else {
            TableError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Json(err.to_string())
    }
}

impl From<rusqlite::Error> for TableError {
    fn from(err: rusqlite::Error) -> Self {
        TableError::Sqlite(err.to_string())
    }
}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Io(err.to_string())
    }
}
