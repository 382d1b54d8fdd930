use super::{FailedRow, IngestionReport, RawRow, RowError, TaskOutcome, TaskRecord, TaskStatus, ValidationError};

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{AmountError, Currency, CurrencyError, TaskId};

fn valid_row(line_number: u64) -> RawRow {
    RawRow {
        line_number,
        transaction_id: "f47ac10b-58cc-4372-a567-0e02b2c3d479".to_string(),
        timestamp: "2024-01-15T10:30:00Z".to_string(),
        amount: "99.99".to_string(),
        currency: "PLN".to_string(),
        customer_id: "550e8400-e29b-41d4-a716-446655440001".to_string(),
        product_id: "6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_string(),
        quantity: "2".to_string()
    }
}

fn rejection(row: &RawRow) -> Option<RowError> {
    row.validate().err().map(|error| error.reason)
}

#[test]
fn test_valid_row_produces_transaction() -> Result<()> {
    let transaction = valid_row(2).validate()?;

    assert_eq!(transaction.transaction_id, Uuid::parse_str("f47ac10b-58cc-4372-a567-0e02b2c3d479")?);
    assert_eq!(transaction.timestamp, DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")?.with_timezone(&Utc));
    assert_eq!(transaction.amount.to_string(), "99.99");
    assert_eq!(transaction.currency, Currency::Pln);
    assert_eq!(transaction.quantity, 2);

    Ok(())
}

#[test]
fn test_timestamps_accept_iso_8601_variants() -> Result<()> {
    for timestamp in ["2024-01-15T10:30:00Z", "2024-01-15T10:30:00.123Z", "2024-01-15T10:30:00+02:00", "2024-01-15T10:30:00"] {
        let row = RawRow { timestamp: timestamp.to_string(), ..valid_row(2) };
        row.validate()?;
    }

    let offset = RawRow { timestamp: "2024-01-15T10:30:00+02:00".to_string(), ..valid_row(2) }.validate()?;

    assert_eq!(offset.timestamp.to_rfc3339(), "2024-01-15T08:30:00+00:00");

    Ok(())
}

#[test]
fn test_timestamps_reject_non_iso_input() {
    for timestamp in ["2024-01-15 10:30:00", "2024/01/15T10:30:00Z", "invalid-date"] {
        let row = RawRow { timestamp: timestamp.to_string(), ..valid_row(2) };

        assert_eq!(rejection(&row), Some(RowError::InvalidTimestamp(timestamp.to_string())));
    }
}

#[test]
fn test_first_violation_in_column_order_wins() {
    let row = RawRow {
        transaction_id: "invalid-uuid".to_string(),
        amount: "-5".to_string(),
        quantity: "0".to_string(),
        ..valid_row(10)
    };

    let error = row.validate().err();

    assert_eq!(
        error.map(|error| error.to_string()),
        Some("Row 10: Invalid UUID format for transaction_id: invalid-uuid".to_string())
    );
}

#[test]
fn test_each_field_reports_its_own_violation() {
    let cases = vec![
        (RawRow { amount: "-5".to_string(), ..valid_row(3) }, RowError::Amount(AmountError::NotPositive("-5".to_string()))),
        (RawRow { currency: "GBP".to_string(), ..valid_row(3) }, RowError::Currency(CurrencyError::Unsupported("GBP".to_string()))),
        (RawRow { customer_id: "nope".to_string(), ..valid_row(3) }, RowError::InvalidUuid { field: "customer_id", value: "nope".to_string() }),
        (RawRow { product_id: String::new(), ..valid_row(3) }, RowError::Missing("product_id")),
        (RawRow { quantity: "1.5".to_string(), ..valid_row(3) }, RowError::InvalidQuantity("1.5".to_string())),
        (RawRow { quantity: "-1".to_string(), ..valid_row(3) }, RowError::NonPositiveQuantity("-1".to_string())),
        (RawRow { quantity: "99999999999".to_string(), ..valid_row(3) }, RowError::InvalidQuantity("99999999999".to_string())),
    ];

    for (row, expected) in cases {
        assert_eq!(rejection(&row), Some(expected));
    }
}

#[test]
fn test_validation_error_converts_into_failed_row() {
    let error = ValidationError { line_number: 3, reason: RowError::Missing("timestamp") };
    let failed_row = FailedRow::from(error);

    assert_eq!(failed_row.line_number, 3);
    assert_eq!(failed_row.error_message, "Row 3: timestamp is required");
}

#[test]
fn test_task_record_follows_lifecycle() -> Result<()> {
    let mut record = TaskRecord::new(TaskId::generate());

    assert_eq!(record.status, TaskStatus::Pending);
    assert!(!record.is_ready());

    record.transition(TaskStatus::Started)?;
    record.complete(TaskOutcome::Completed(IngestionReport { total_rows: 3, ..Default::default() }))?;

    assert_eq!(record.status, TaskStatus::Success);
    assert!(record.is_ready());
    assert_eq!(record.progress.rows_processed, 3);
    assert!(record.status_view().ready);

    Ok(())
}

#[test]
fn test_task_record_rejects_invalid_transitions() -> Result<()> {
    let mut record = TaskRecord::new(TaskId::generate());

    assert!(record.transition(TaskStatus::Success).is_err());

    record.complete(TaskOutcome::Failed("Missing required columns: amount".to_string()))?;

    assert_eq!(record.status, TaskStatus::Failure);
    assert_eq!(record.error.as_deref(), Some("Missing required columns: amount"));
    assert!(record.transition(TaskStatus::Started).is_err());

    Ok(())
}

#[test]
fn test_task_status_serializes_uppercase() -> Result<()> {
    let view = TaskRecord::new(TaskId::generate()).status_view();
    let json = serde_json::to_value(&view)?;

    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["ready"], false);
    assert!(json.get("result").is_none());

    Ok(())
}
