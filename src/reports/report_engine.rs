use crate::models::Transaction;
use crate::reports::errors::ReportError;
use crate::reports::query::LeaderboardQuery;
use crate::reports::summary::{CurrencyBuckets, CustomerSummary, ProductSummary, RankedEntry};
use crate::storage::{TransactionFilter, TransactionStore};
use crate::types::{Currency, CustomerId, DateRange, ProductId, TransactionId};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Read-only aggregations over the stored transactions.
///
/// Holds no state of its own; every call scans the store again, so results
/// include rows from ingestion tasks that are still running.
pub struct ReportEngine<S: TransactionStore> {
    storage: Arc<S>
}

impl<S: TransactionStore> ReportEngine<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Count and per-currency spend for one customer. A customer with no
    /// matching rows gets an empty summary, not an error.
    pub fn customer_summary(&self, customer_id: CustomerId, range: &DateRange) -> Result<CustomerSummary, ReportError> {
        let filter = TransactionFilter::for_customer(customer_id).within(*range);

        let mut summary = CustomerSummary {
            customer_id,
            transaction_count: 0,
            spend: Vec::new(),
            unique_products_count: 0,
            last_transaction_date: None
        };
        let mut spend = CurrencyBuckets::default();
        let mut products = HashSet::new();
        let mut failure = None;

        self.storage.scan(&filter, &mut |transaction: &Transaction| {
            summary.transaction_count += 1;
            products.insert(transaction.product_id);
            summary.last_transaction_date = summary.last_transaction_date.max(Some(transaction.timestamp));

            if let Err(error) = spend.add(customer_id, transaction.currency, Some(transaction.amount.value())) {
                failure.get_or_insert(error);
            }
        });

        if let Some(error) = failure {
            return Err(error);
        }

        summary.spend = spend.into_totals();
        summary.unique_products_count = products.len();

        debug!("Customer [{customer_id}] summary covers {} transactions", summary.transaction_count);

        Ok(summary)
    }

    /// Count, per-currency totals and revenue for one product.
    pub fn product_summary(&self, product_id: ProductId, range: &DateRange) -> Result<ProductSummary, ReportError> {
        let filter = TransactionFilter::for_product(product_id).within(*range);

        let mut summary = ProductSummary {
            product_id,
            transaction_count: 0,
            totals: Vec::new(),
            revenue: Vec::new(),
            total_quantity_sold: 0,
            unique_customers_count: 0
        };
        let mut totals = CurrencyBuckets::default();
        let mut revenue = CurrencyBuckets::default();
        let mut customers = HashSet::new();
        let mut failure = None;

        self.storage.scan(&filter, &mut |transaction: &Transaction| {
            summary.transaction_count += 1;
            summary.total_quantity_sold += u64::from(transaction.quantity);
            customers.insert(transaction.customer_id);

            let added = totals.add(product_id, transaction.currency, Some(transaction.amount.value()))
                .and_then(|_| revenue.add(product_id, transaction.currency, line_revenue(transaction)));

            if let Err(error) = added {
                failure.get_or_insert(error);
            }
        });

        if let Some(error) = failure {
            return Err(error);
        }

        summary.totals = totals.into_totals();
        summary.revenue = revenue.into_totals();
        summary.unique_customers_count = customers.len();

        debug!("Product [{product_id}] summary covers {} transactions", summary.transaction_count);

        Ok(summary)
    }

    /// Customers ranked by spend (sum of `amount`).
    pub fn top_customers(&self, query: &LeaderboardQuery) -> Result<Vec<RankedEntry>, ReportError> {
        self.rank(query, |transaction| transaction.customer_id, |transaction| Some(transaction.amount.value()))
    }

    /// Products ranked by revenue (sum of `amount * quantity`).
    pub fn top_products(&self, query: &LeaderboardQuery) -> Result<Vec<RankedEntry>, ReportError> {
        self.rank(query, |transaction| transaction.product_id, line_revenue)
    }

    pub fn find_transaction(&self, transaction_id: &TransactionId) -> Option<Transaction> {
        self.storage.get(transaction_id)
    }

    /// Matching transactions, newest first.
    pub fn list_transactions(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let mut transactions = Vec::new();

        self.storage.scan(filter, &mut |transaction: &Transaction| transactions.push(transaction.clone()));

        transactions.sort_by(|left, right| {
            right.timestamp.cmp(&left.timestamp)
                .then_with(|| left.transaction_id.cmp(&right.transaction_id))
        });

        transactions
    }

    fn rank<K, V>(&self, query: &LeaderboardQuery, key: K, value: V) -> Result<Vec<RankedEntry>, ReportError>
    where
        K: Fn(&Transaction) -> Uuid,
        V: Fn(&Transaction) -> Option<Decimal>
    {
        let filter = TransactionFilter::all().within(query.range);
        let mut groups: HashMap<(Uuid, Currency), (Decimal, u64)> = HashMap::new();
        let mut failure = None;

        self.storage.scan(&filter, &mut |transaction: &Transaction| {
            if query.currency.is_some_and(|currency| currency != transaction.currency) {
                return;
            }

            let entity_id = key(transaction);
            let (total, count) = groups.entry((entity_id, transaction.currency)).or_insert((Decimal::ZERO, 0));

            match value(transaction).and_then(|value| total.checked_add(value)) {
                Some(sum) => {
                    *total = sum;
                    *count += 1;
                }
                None => {
                    failure.get_or_insert(ReportError::Overflow { entity_id, currency: transaction.currency });
                }
            }
        });

        if let Some(error) = failure {
            return Err(error);
        }

        let mut entries: Vec<RankedEntry> = groups
            .into_iter()
            .map(|((entity_id, currency), (total, transaction_count))| RankedEntry {
                entity_id,
                currency,
                total,
                transaction_count
            })
            .collect();

        entries.sort_by(|left, right| {
            right.total.cmp(&left.total)
                .then_with(|| left.entity_id.cmp(&right.entity_id))
                .then_with(|| left.currency.cmp(&right.currency))
        });
        entries.truncate(query.limit.get());

        Ok(entries)
    }
}

fn line_revenue(transaction: &Transaction) -> Option<Decimal> {
    transaction.amount.checked_mul_quantity(transaction.quantity)
}
