use crate::models::Transaction;
use crate::types::{CustomerId, DateRange, ProductId};

/// Row predicate pushed down to [`TransactionStore::scan`](crate::storage::TransactionStore::scan).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TransactionFilter {
    pub customer_id: Option<CustomerId>,
    pub product_id: Option<ProductId>,
    pub range: DateRange
}

impl TransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self { customer_id: Some(customer_id), ..Self::default() }
    }

    pub fn for_product(product_id: ProductId) -> Self {
        Self { product_id: Some(product_id), ..Self::default() }
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.customer_id.is_none_or(|customer_id| transaction.customer_id == customer_id)
            && self.product_id.is_none_or(|product_id| transaction.product_id == product_id)
            && self.range.contains(&transaction.timestamp)
    }
}
