use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Amount, Currency, CustomerId, ProductId, TransactionId};

/// A validated transaction as persisted by the storage layer.
///
/// Instances are only produced by [`RawRow::validate`](crate::models::RawRow::validate)
/// and are never mutated afterwards. `transaction_id` is the natural key.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Transaction {
    /// Externally supplied natural key.
    pub transaction_id: TransactionId,
    /// Instant of the purchase, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// Unit price, strictly positive, two decimal places.
    pub amount: Amount,
    /// Reported currency; amounts are never converted.
    pub currency: Currency,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    /// Number of units, strictly positive.
    pub quantity: u32
}
