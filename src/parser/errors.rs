use thiserror::Error;

/// Structural failures. Any of these aborts the whole ingestion task.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("CSV file is empty or has no header row")]
    MissingHeader,
    #[error("Missing required columns: {0}")]
    MissingColumns(String),
    #[error("Duplicate columns: {0}")]
    DuplicateColumns(String),
    #[error("Unexpected columns: {0}")]
    UnexpectedColumns(String),
    #[error("Unable to read CSV stream: {0}")]
    Unreadable(String)
}
