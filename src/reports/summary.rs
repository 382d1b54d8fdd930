use crate::reports::errors::ReportError;
use crate::types::{Currency, CustomerId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Sum of amounts in one currency. Currencies are never mixed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CurrencyTotal {
    pub currency: Currency,
    pub total: Decimal
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub transaction_count: u64,
    /// Sum of `amount`, one entry per currency seen.
    pub spend: Vec<CurrencyTotal>,
    pub unique_products_count: usize,
    pub last_transaction_date: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub transaction_count: u64,
    /// Sum of `amount`, one entry per currency seen.
    pub totals: Vec<CurrencyTotal>,
    /// Sum of `amount * quantity`, one entry per currency seen.
    pub revenue: Vec<CurrencyTotal>,
    pub total_quantity_sold: u64,
    pub unique_customers_count: usize
}

/// One leaderboard line. An entity trading in two currencies appears twice.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct RankedEntry {
    pub entity_id: Uuid,
    pub currency: Currency,
    pub total: Decimal,
    pub transaction_count: u64
}

/// Per-currency running sums with overflow detection.
#[derive(Debug, Default)]
pub(crate) struct CurrencyBuckets {
    totals: BTreeMap<Currency, Decimal>
}

impl CurrencyBuckets {
    pub(crate) fn add(&mut self, entity_id: Uuid, currency: Currency, value: Option<Decimal>) -> Result<(), ReportError> {
        let overflow = ReportError::Overflow { entity_id, currency };
        let total = self.totals.entry(currency).or_insert(Decimal::ZERO);

        *total = value
            .and_then(|value| total.checked_add(value))
            .ok_or(overflow)?;

        Ok(())
    }

    /// Totals in currency order.
    pub(crate) fn into_totals(self) -> Vec<CurrencyTotal> {
        self.totals
            .into_iter()
            .map(|(currency, total)| CurrencyTotal { currency, total })
            .collect()
    }
}
