mod filter;
#[cfg(test)]
mod tests;
mod transaction_storage;

use crate::models::Transaction;
use crate::types::{TaskId, TransactionId};

pub use filter::TransactionFilter;
pub use transaction_storage::TransactionStorage;

/// Transaction table shared by every ingestion task.
///
/// Each stored row remembers the tasks that claimed it, either by inserting
/// it or by meeting it as a duplicate. A row only disappears once every
/// claimant has released it.
pub trait TransactionStore: Send + Sync + 'static {
    /// Inserts the transaction unless its `transaction_id` is already stored,
    /// and records `claimant` against the row either way.
    /// Returns `true` only when a new row was written.
    fn upsert(&self, transaction: Transaction, claimant: TaskId) -> bool;
    fn get(&self, transaction_id: &TransactionId) -> Option<Transaction>;
    /// Drops `claimant`'s claim on the row. The row is deleted and returned
    /// only when no other claim remains.
    fn release(&self, transaction_id: &TransactionId, claimant: TaskId) -> Option<Transaction>;
    fn len(&self) -> usize;
    fn scan(&self, filter: &TransactionFilter, visit: &mut dyn FnMut(&Transaction));

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
