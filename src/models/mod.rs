mod errors;
mod row;
mod task;
#[cfg(test)]
mod tests;
mod transaction;

pub use errors::{RowError, TransitionError, ValidationError};
pub use row::RawRow;
pub use task::{FailedRow, IngestionReport, TaskOutcome, TaskProgress, TaskRecord, TaskStatus, TaskStatusView};
pub use transaction::Transaction;

/// Column names of the CSV wire format, in their canonical order.
pub const EXPECTED_COLUMNS: [&str; 7] = [
    "transaction_id",
    "timestamp",
    "amount",
    "currency",
    "customer_id",
    "product_id",
    "quantity"
];
