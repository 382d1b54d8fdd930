use crate::models::TaskStatus;
use crate::types::{AmountError, CurrencyError};
use thiserror::Error;

/// Why a single CSV row was rejected.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RowError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Invalid UUID format for {field}: {value}")]
    InvalidUuid {
        field: &'static str,
        value: String
    },
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Currency(#[from] CurrencyError),
    #[error("Invalid quantity format: {0}")]
    InvalidQuantity(String),
    #[error("quantity must be positive: {0}")]
    NonPositiveQuantity(String),
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        expected: usize,
        found: usize
    },
    #[error("Malformed record: {0}")]
    Malformed(String)
}

/// A [`RowError`] tagged with the source line it came from.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Row {line_number}: {reason}")]
pub struct ValidationError {
    pub line_number: u64,
    #[source]
    pub reason: RowError
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("Task cannot move from [{from}] to [{to}]")]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus
}
