use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AmountError {
    #[error("amount is required")]
    Missing,
    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),
    #[error("amount has more than 2 decimal places: {0}")]
    TooManyDecimalPlaces(String),
    #[error("amount must be positive: {0}")]
    NotPositive(String),
    #[error("amount exceeds 8 integer digits: {0}")]
    OutOfRange(String)
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CurrencyError {
    #[error("currency is required")]
    Missing,
    #[error("Invalid currency: {0}. Must be one of PLN, EUR, USD")]
    Unsupported(String)
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DateRangeError {
    #[error("Invalid {field} format: {value}. Expected YYYY-MM-DD")]
    InvalidDate {
        field: &'static str,
        value: String
    },
    #[error("start_date [{start}] is after end_date [{end}]")]
    Inverted {
        start: NaiveDate,
        end: NaiveDate
    }
}
