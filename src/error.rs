#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed CSV field at data row {row}, column '{column}' (value {value:?}): {reason}")]
    Load {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Missing CSV column: {0}")]
    MissingColumn(String),

    #[error("Query service error: {0}")]
    Service(String),

    #[error("Offline: {0}")]
    Offline(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, QaError>;
