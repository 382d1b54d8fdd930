use crate::types::{Currency, CurrencyError, DateRangeError};
use thiserror::Error;
use uuid::Uuid;

/// Rejected report parameters. Raised before any transaction is read.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Range(#[from] DateRangeError),
    #[error("limit must be a positive integer: {0}")]
    InvalidLimit(String),
    #[error(transparent)]
    Currency(#[from] CurrencyError)
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ReportError {
    #[error("Total for [{entity_id}] in {currency} exceeds the supported decimal range")]
    Overflow {
        entity_id: Uuid,
        currency: Currency
    }
}
