use chrono::{DateTime, NaiveDateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::errors::{RowError, ValidationError};
use crate::models::Transaction;
use crate::types::{Amount, Currency};

const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One CSV data row with every expected column already resolved by position.
///
/// `line_number` is the physical line in the source file where the record
/// starts; the header occupies line 1.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RawRow {
    pub line_number: u64,
    pub transaction_id: String,
    pub timestamp: String,
    pub amount: String,
    pub currency: String,
    pub customer_id: String,
    pub product_id: String,
    pub quantity: String
}

impl RawRow {
    /// Validates the row into a [`Transaction`].
    ///
    /// Fields are checked in column order and the first violation is reported.
    /// This function has no side effects.
    pub fn validate(&self) -> Result<Transaction, ValidationError> {
        self.try_into_transaction().map_err(|reason| ValidationError {
            line_number: self.line_number,
            reason
        })
    }

    fn try_into_transaction(&self) -> Result<Transaction, RowError> {
        let transaction_id = parse_uuid("transaction_id", &self.transaction_id)?;
        let timestamp = parse_timestamp(&self.timestamp)?;
        let amount = Amount::from_str(&self.amount)?;
        let currency = Currency::from_str(&self.currency)?;
        let customer_id = parse_uuid("customer_id", &self.customer_id)?;
        let product_id = parse_uuid("product_id", &self.product_id)?;
        let quantity = parse_quantity(&self.quantity)?;

        Ok(Transaction {
            transaction_id,
            timestamp,
            amount,
            currency,
            customer_id,
            product_id,
            quantity
        })
    }
}

fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, RowError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(RowError::Missing(field));
    }

    Uuid::parse_str(value).map_err(|_| RowError::InvalidUuid {
        field,
        value: value.to_string()
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RowError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(RowError::Missing("timestamp"));
    }

    // chrono tolerates a space separator in RFC 3339 input; ISO 8601 does not.
    if value.contains(' ') {
        return Err(RowError::InvalidTimestamp(value.to_string()));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, NAIVE_TIMESTAMP_FORMAT).map(|naive| naive.and_utc()))
        .map_err(|_| RowError::InvalidTimestamp(value.to_string()))
}

fn parse_quantity(value: &str) -> Result<u32, RowError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(RowError::Missing("quantity"));
    }

    let quantity: i64 = value.parse()
        .map_err(|_| RowError::InvalidQuantity(value.to_string()))?;

    if quantity <= 0 {
        return Err(RowError::NonPositiveQuantity(value.to_string()));
    }

    u32::try_from(quantity).map_err(|_| RowError::InvalidQuantity(value.to_string()))
}
