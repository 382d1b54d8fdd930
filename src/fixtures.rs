use anyhow::Result;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::Transaction;
use crate::types::{Amount, Currency};

pub const HEADER: &str = "transaction_id,timestamp,amount,currency,customer_id,product_id,quantity";

pub fn id(seed: u128) -> Uuid {
    Uuid::from_u128(seed)
}

/// A PLN transaction for one unit. Adjust other fields with struct update syntax.
pub fn transaction(transaction_seed: u128, customer_seed: u128, product_seed: u128, amount: &str, timestamp: &str) -> Result<Transaction> {
    Ok(Transaction {
        transaction_id: id(transaction_seed),
        timestamp: DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc),
        amount: Amount::from_str(amount)?,
        currency: Currency::Pln,
        customer_id: id(customer_seed),
        product_id: id(product_seed),
        quantity: 1
    })
}

/// One CSV line in the canonical column order.
pub fn csv_line(transaction_seed: u128, customer_seed: u128, amount: &str, currency: &str) -> String {
    format!(
        "{},2024-01-15T10:30:00Z,{},{},{},{},1",
        id(transaction_seed),
        amount,
        currency,
        id(customer_seed),
        id(0xF00D)
    )
}

pub fn csv_document(lines: &[String]) -> String {
    let mut document = String::from(HEADER);

    for line in lines {
        document.push('\n');
        document.push_str(line);
    }

    document.push('\n');
    document
}
