use crate::models::Transaction;
use crate::storage::{TransactionFilter, TransactionStore};
use crate::types::{TaskId, TransactionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;

struct StoredTransaction {
    transaction: Transaction,
    claims: HashSet<TaskId>
}

/// In-process transaction table keyed by the natural `transaction_id`.
///
/// Shards are locked per key, so concurrent ingestion tasks can write while
/// report queries iterate. Readers see rows as soon as they are inserted.
pub struct TransactionStorage {
    transactions: DashMap<TransactionId, StoredTransaction>
}

impl TransactionStorage {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new()
        }
    }
}

impl Default for TransactionStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for TransactionStorage {
    fn upsert(&self, transaction: Transaction, claimant: TaskId) -> bool {
        match self.transactions.entry(transaction.transaction_id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().claims.insert(claimant);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredTransaction {
                    transaction,
                    claims: HashSet::from([claimant])
                });
                true
            }
        }
    }

    fn get(&self, transaction_id: &TransactionId) -> Option<Transaction> {
        self.transactions.get(transaction_id).map(|entry| entry.transaction.clone())
    }

    fn release(&self, transaction_id: &TransactionId, claimant: TaskId) -> Option<Transaction> {
        match self.transactions.entry(*transaction_id) {
            Entry::Occupied(mut entry) => {
                let claims = &mut entry.get_mut().claims;
                claims.remove(&claimant);

                if claims.is_empty() {
                    Some(entry.remove().transaction)
                } else {
                    None
                }
            }
            Entry::Vacant(_) => None
        }
    }

    fn len(&self) -> usize {
        self.transactions.len()
    }

    fn scan(&self, filter: &TransactionFilter, visit: &mut dyn FnMut(&Transaction)) {
        for entry in self.transactions.iter() {
            if filter.matches(&entry.transaction) {
                visit(&entry.transaction);
            }
        }
    }
}
