use super::{FileTaskRegistry, MemoryTaskRegistry, RegistryError, TaskRegistry};

use anyhow::Result;
use std::time::Duration;
use tempfile::TempDir;

use crate::models::{FailedRow, IngestionReport, TaskOutcome, TaskProgress, TaskStatus};
use crate::types::TaskId;

fn sample_report() -> IngestionReport {
    IngestionReport {
        total_rows: 3,
        successful_transactions: 2,
        duplicate_transactions: 0,
        failed_rows: vec![FailedRow { line_number: 3, error_message: "Row 3: amount must be positive: -5".to_string() }],
        created_transaction_ids: Vec::new()
    }
}

async fn exercise_lifecycle<R: TaskRegistry>(registry: &R) -> Result<()> {
    let task_id = registry.create().await?;

    assert_eq!(registry.get(task_id).await?.status, TaskStatus::Pending);

    registry.set_status(task_id, TaskStatus::Started).await?;
    registry.set_progress(task_id, TaskProgress { rows_processed: 2, rows_failed: 1 }).await?;

    let started = registry.get(task_id).await?;

    assert_eq!(started.status, TaskStatus::Started);
    assert_eq!(started.progress.rows_processed, 2);
    assert!(!started.is_ready());

    registry.set_result(task_id, TaskOutcome::Completed(sample_report())).await?;

    let finished = registry.get(task_id).await?;

    assert_eq!(finished.status, TaskStatus::Success);
    assert_eq!(finished.result, Some(sample_report()));
    assert_eq!(finished.progress.rows_processed, 3);

    Ok(())
}

async fn exercise_unknown_ids<R: TaskRegistry>(registry: &R) {
    let unknown = TaskId::generate();

    assert!(matches!(registry.get(unknown).await, Err(RegistryError::NotFound(task_id)) if task_id == unknown));
    assert!(matches!(registry.set_status(unknown, TaskStatus::Started).await, Err(RegistryError::NotFound(_))));
}

async fn exercise_invalid_transitions<R: TaskRegistry>(registry: &R) -> Result<()> {
    let task_id = registry.create().await?;

    assert!(matches!(
        registry.set_result(task_id, TaskOutcome::Completed(IngestionReport::default())).await,
        Err(RegistryError::Transition(_))
    ));

    registry.set_result(task_id, TaskOutcome::Failed("Unable to read CSV stream".to_string())).await?;

    assert!(matches!(registry.set_status(task_id, TaskStatus::Started).await, Err(RegistryError::Transition(_))));
    assert_eq!(registry.get(task_id).await?.error.as_deref(), Some("Unable to read CSV stream"));

    Ok(())
}

#[tokio::test]
async fn test_memory_registry_tracks_task_lifecycle() -> Result<()> {
    let registry = MemoryTaskRegistry::new();

    exercise_lifecycle(&registry).await?;
    exercise_unknown_ids(&registry).await;
    exercise_invalid_transitions(&registry).await
}

#[tokio::test]
async fn test_file_registry_tracks_task_lifecycle() -> Result<()> {
    let directory = TempDir::new()?;
    let registry = FileTaskRegistry::open(directory.path()).await?;

    exercise_lifecycle(&registry).await?;
    exercise_unknown_ids(&registry).await;
    exercise_invalid_transitions(&registry).await
}

#[tokio::test]
async fn test_file_registry_is_shared_across_instances() -> Result<()> {
    // Two handles on one directory stand in for the submitting and worker processes.
    let directory = TempDir::new()?;
    let submitter = FileTaskRegistry::open(directory.path()).await?;
    let worker = FileTaskRegistry::open(directory.path()).await?;

    let task_id = submitter.create().await?;

    worker.set_status(task_id, TaskStatus::Started).await?;

    assert_eq!(submitter.get(task_id).await?.status, TaskStatus::Started);

    worker.set_result(task_id, TaskOutcome::Completed(sample_report())).await?;

    let record = submitter.get(task_id).await?;

    assert_eq!(record.status, TaskStatus::Success);
    assert!(record.status_view().ready);

    Ok(())
}

#[tokio::test]
async fn test_file_registry_serves_terminal_records_from_cache() -> Result<()> {
    let directory = TempDir::new()?;
    let registry = FileTaskRegistry::open(directory.path()).await?
        .with_cache(16, Duration::from_secs(60));

    let task_id = registry.create().await?;
    registry.set_result(task_id, TaskOutcome::Failed("Missing required columns: amount".to_string())).await?;

    tokio::fs::remove_file(directory.path().join(format!("{task_id}.json"))).await?;

    assert_eq!(registry.get(task_id).await?.status, TaskStatus::Failure);

    Ok(())
}

#[tokio::test]
async fn test_file_registry_reports_corrupt_entries() -> Result<()> {
    let directory = TempDir::new()?;
    let registry = FileTaskRegistry::open(directory.path()).await?;
    let task_id = registry.create().await?;

    tokio::fs::write(directory.path().join(format!("{task_id}.json")), b"{not json").await?;

    assert!(matches!(registry.get(task_id).await, Err(RegistryError::Corrupt { .. })));

    Ok(())
}
