use crate::engine::errors::IngestionError;
use crate::engine::source::IngestionSource;
use crate::models::{IngestionReport, TaskOutcome, TaskProgress, TaskStatus};
use crate::parser::{CsvRowStream, ParseError, ParsedRecord};
use crate::registry::TaskRegistry;
use crate::storage::TransactionStore;
use crate::types::{TaskId, TransactionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, info, warn};

type RowItem = Result<ParsedRecord, ParseError>;

/// Drives one CSV upload through parsing, validation and persistence.
///
/// Rows are handled strictly in file order. A bad row is recorded and
/// skipped; only a structural problem with the stream fails the task.
pub struct IngestionEngine<S: TransactionStore, R: TaskRegistry> {
    storage: Arc<S>,
    registry: Arc<R>,
    backpressure: usize,
    progress_interval: u64
}

impl<S: TransactionStore, R: TaskRegistry> IngestionEngine<S, R> {
    /// Creates a new engine writing rows to `storage` and task state to `registry`.
    pub fn new(storage: Arc<S>, registry: Arc<R>) -> Self {
        Self {
            storage,
            registry,
            backpressure: 256,
            progress_interval: 100
        }
    }

    /// Bounds the number of parsed rows buffered between the reader and the processor.
    pub fn with_backpressure(mut self, backpressure: usize) -> Self {
        self.backpressure = backpressure.max(1);
        self
    }

    /// Sets how many rows pass between progress updates in the registry.
    pub fn with_progress_interval(mut self, progress_interval: u64) -> Self {
        self.progress_interval = progress_interval.max(1);
        self
    }

    pub fn storage(&self) -> Arc<S> {
        self.storage.clone()
    }

    pub fn registry(&self) -> Arc<R> {
        self.registry.clone()
    }

    /// Runs an ingestion task to completion and records its outcome.
    ///
    /// The task is moved to `STARTED`, then to `SUCCESS` with the report once
    /// the stream is exhausted, even when every row was rejected. If the
    /// stream cannot be read the task is moved to `FAILURE` and its claims on
    /// stored rows are released. Rows that another task also claimed stay.
    pub async fn ingest(&self, task_id: TaskId, source: IngestionSource) -> Result<IngestionReport, IngestionError> {
        self.registry.set_status(task_id, TaskStatus::Started).await?;
        info!("Task [{task_id}] started reading {source}");

        let (sender, receiver) = mpsc::channel::<RowItem>(self.backpressure);
        let reader_handle = self.spawn_csv_reader(source, sender);

        let mut report = IngestionReport::default();
        let processed = self.process_rows(task_id, receiver, &mut report).await;
        let read = reader_handle.await
            .map_err(|error| IngestionError::ReaderFailed(error.to_string()));

        match processed.and(read) {
            Ok(()) => {
                self.registry.set_result(task_id, TaskOutcome::Completed(report.clone())).await?;

                info!(
                    "Task [{task_id}] finished: {} rows, {} stored, {} duplicates, {} rejected",
                    report.total_rows,
                    report.successful_transactions,
                    report.duplicate_transactions,
                    report.failed_rows.len()
                );

                Ok(report)
            }
            Err(failure) => {
                error!("Task [{task_id}] failed: {failure}");
                self.roll_back(task_id, &report.created_transaction_ids);

                if let Err(registry_error) = self.registry.set_result(task_id, TaskOutcome::Failed(failure.to_string())).await {
                    error!("Task [{task_id}] failure could not be recorded: {registry_error}");
                }

                Err(failure)
            }
        }
    }

    fn spawn_csv_reader(&self, source: IngestionSource, sender: mpsc::Sender<RowItem>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let description = source.to_string();

            let reader = match source.open() {
                Ok(reader) => reader,
                Err(error) => {
                    let failure = ParseError::Unreadable(format!("{description}: {error}"));

                    if sender.blocking_send(Err(failure)).is_err() {
                        debug!("Row processor went away before {description} was opened");
                    }

                    return;
                }
            };

            let stream = match CsvRowStream::new(reader) {
                Ok(stream) => stream,
                Err(failure) => {
                    if sender.blocking_send(Err(failure)).is_err() {
                        debug!("Row processor went away before the header of {description} was checked");
                    }

                    return;
                }
            };

            for item in stream {
                if sender.blocking_send(item).is_err() {
                    break;
                }
            }
        })
    }

    async fn process_rows(&self, task_id: TaskId, mut receiver: mpsc::Receiver<RowItem>, report: &mut IngestionReport) -> Result<(), IngestionError> {
        while let Some(item) = receiver.recv().await {
            let record = item?;
            report.total_rows += 1;

            let validated = match record {
                ParsedRecord::Row(row) => row.validate(),
                ParsedRecord::Rejected(rejection) => Err(rejection)
            };

            match validated {
                Ok(transaction) => {
                    let transaction_id = transaction.transaction_id;

                    if self.storage.upsert(transaction, task_id) {
                        debug!("Task [{task_id}] stored transaction [{transaction_id}]");
                    } else {
                        debug!("Task [{task_id}] skipped already stored transaction [{transaction_id}]");
                        report.duplicate_transactions += 1;
                    }

                    report.successful_transactions += 1;
                    report.created_transaction_ids.push(transaction_id);
                }
                Err(rejection) => {
                    warn!("Task [{task_id}] {rejection}");
                    report.failed_rows.push(rejection.into());
                }
            }

            if report.total_rows % self.progress_interval == 0 {
                let progress = TaskProgress {
                    rows_processed: report.total_rows,
                    rows_failed: report.failed_rows.len() as u64
                };

                self.registry.set_progress(task_id, progress).await?;
            }
        }

        Ok(())
    }

    fn roll_back(&self, task_id: TaskId, claimed: &[TransactionId]) {
        let removed = claimed.iter()
            .filter_map(|transaction_id| self.storage.release(transaction_id, task_id))
            .count();

        if !claimed.is_empty() {
            warn!("Task [{task_id}] released {} rows after failing, {removed} of them were removed", claimed.len());
        }
    }
}
