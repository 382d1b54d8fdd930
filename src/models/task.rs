use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::models::errors::{TransitionError, ValidationError};
use crate::types::{TaskId, TransactionId};

/// Lifecycle of an ingestion task.
///
/// `Pending -> Started -> {Success, Failure}`; a pending task may also fail
/// directly. `Success` means the file was read to the end, not that every row
/// was valid.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    Failure
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Started)
                | (TaskStatus::Pending, TaskStatus::Failure)
                | (TaskStatus::Started, TaskStatus::Success)
                | (TaskStatus::Started, TaskStatus::Failure)
        )
    }
}

impl Display for TaskStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Started => "STARTED",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE"
        };

        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub rows_processed: u64,
    pub rows_failed: u64
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FailedRow {
    pub line_number: u64,
    pub error_message: String
}

impl From<ValidationError> for FailedRow {
    fn from(error: ValidationError) -> Self {
        Self {
            line_number: error.line_number,
            error_message: error.to_string()
        }
    }
}

/// Final result of an ingestion run that read its file to the end.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub total_rows: u64,
    pub successful_transactions: u64,
    /// Rows whose `transaction_id` was already stored and were skipped.
    /// They are included in `successful_transactions`.
    pub duplicate_transactions: u64,
    /// In source order.
    pub failed_rows: Vec<FailedRow>,
    /// In source order, including skipped duplicates.
    pub created_transaction_ids: Vec<TransactionId>
}

/// Terminal payload written to the registry when a task finishes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TaskOutcome {
    Completed(IngestionReport),
    Failed(String)
}

impl TaskOutcome {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Completed(_) => TaskStatus::Success,
            TaskOutcome::Failed(_) => TaskStatus::Failure
        }
    }
}

/// Registry entry for one task.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: TaskProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<IngestionReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

impl TaskRecord {
    pub fn new(task_id: TaskId) -> Self {
        let now = Utc::now();

        Self {
            task_id,
            status: TaskStatus::Pending,
            progress: TaskProgress::default(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn transition(&mut self, next: TaskStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError { from: self.status, to: next });
        }

        self.status = next;
        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn record_progress(&mut self, progress: TaskProgress) {
        self.progress = progress;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self, outcome: TaskOutcome) -> Result<(), TransitionError> {
        self.transition(outcome.status())?;

        match outcome {
            TaskOutcome::Completed(report) => {
                self.progress = TaskProgress {
                    rows_processed: report.total_rows,
                    rows_failed: report.failed_rows.len() as u64
                };
                self.result = Some(report);
            }
            TaskOutcome::Failed(error) => {
                self.error = Some(error);
            }
        }

        Ok(())
    }

    pub fn status_view(&self) -> TaskStatusView {
        TaskStatusView {
            task_id: self.task_id,
            status: self.status,
            ready: self.is_ready(),
            progress: self.progress,
            result: self.result.clone(),
            error: self.error.clone()
        }
    }
}

/// What a status poll returns. `ready` is true only in a terminal state.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TaskStatusView {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub ready: bool,
    pub progress: TaskProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<IngestionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
}
