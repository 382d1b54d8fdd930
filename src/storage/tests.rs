use super::{TransactionFilter, TransactionStorage, TransactionStore};
use crate::fixtures::{id, transaction};
use crate::models::Transaction;
use crate::types::{Currency, DateRange, TaskId};
use anyhow::{anyhow, Result};

#[test]
fn test_storage_basic_upsert_and_get_operations() -> Result<()> {
    let storage = TransactionStorage::new();

    assert!(storage.get(&id(99)).is_none());
    assert!(storage.is_empty());

    assert!(storage.upsert(transaction(1, 10, 20, "100.00", "2024-01-15T10:30:00Z")?, TaskId::generate()));

    let retrieved = storage.get(&id(1)).ok_or_else(|| anyhow!("Transaction not found in storage"))?;

    assert_eq!(retrieved.customer_id, id(10));
    assert_eq!(retrieved.amount.to_string(), "100.00");
    assert_eq!(storage.len(), 1);

    Ok(())
}

#[test]
fn test_storage_skips_existing_natural_key() -> Result<()> {
    let storage = TransactionStorage::new();
    let original = transaction(1, 10, 20, "10.00", "2024-01-15T10:30:00Z")?;
    let conflicting = Transaction { currency: Currency::Eur, ..transaction(1, 11, 21, "20.00", "2024-02-15T10:30:00Z")? };

    assert!(storage.upsert(original.clone(), TaskId::generate()));
    assert!(!storage.upsert(conflicting, TaskId::generate()));

    assert_eq!(storage.get(&id(1)), Some(original));
    assert_eq!(storage.len(), 1);

    Ok(())
}

#[test]
fn test_storage_release_deletes_row_of_sole_claimant() -> Result<()> {
    let storage = TransactionStorage::new();
    let task = TaskId::generate();
    storage.upsert(transaction(1, 10, 20, "10.00", "2024-01-15T10:30:00Z")?, task);

    assert!(storage.release(&id(1), task).is_some());
    assert!(storage.release(&id(1), task).is_none());
    assert!(storage.is_empty());

    Ok(())
}

#[test]
fn test_storage_release_keeps_row_claimed_by_another_task() -> Result<()> {
    let storage = TransactionStorage::new();
    let (inserting, duplicating) = (TaskId::generate(), TaskId::generate());

    assert!(storage.upsert(transaction(1, 10, 20, "10.00", "2024-01-15T10:30:00Z")?, inserting));
    assert!(!storage.upsert(transaction(1, 10, 20, "10.00", "2024-01-15T10:30:00Z")?, duplicating));

    assert!(storage.release(&id(1), inserting).is_none());
    assert!(storage.get(&id(1)).is_some());

    assert!(storage.release(&id(1), duplicating).is_some());
    assert!(storage.get(&id(1)).is_none());

    Ok(())
}

#[test]
fn test_storage_scan_applies_filter() -> Result<()> {
    let storage = TransactionStorage::new();
    let task = TaskId::generate();
    storage.upsert(transaction(1, 10, 20, "10.00", "2024-01-15T10:30:00Z")?, task);
    storage.upsert(transaction(2, 10, 21, "20.00", "2024-03-15T10:30:00Z")?, task);
    storage.upsert(transaction(3, 11, 20, "30.00", "2024-01-20T10:30:00Z")?, task);

    let collect = |filter: TransactionFilter| {
        let mut ids = Vec::new();
        storage.scan(&filter, &mut |transaction: &Transaction| ids.push(transaction.transaction_id));
        ids.sort();
        ids
    };

    assert_eq!(collect(TransactionFilter::all()).len(), 3);
    assert_eq!(collect(TransactionFilter::for_customer(id(10))), vec![id(1), id(2)]);
    assert_eq!(collect(TransactionFilter::for_product(id(20))), vec![id(1), id(3)]);

    let january = DateRange::parse(Some("2024-01-01"), Some("2024-01-31"))?;

    assert_eq!(collect(TransactionFilter::for_customer(id(10)).within(january)), vec![id(1)]);

    Ok(())
}
