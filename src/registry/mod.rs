mod errors;
mod file_registry;
mod memory_registry;
#[cfg(test)]
mod tests;

use std::future::Future;

use crate::models::{TaskOutcome, TaskProgress, TaskRecord, TaskStatus};
use crate::types::TaskId;

pub use errors::RegistryError;
pub use file_registry::FileTaskRegistry;
pub use memory_registry::MemoryTaskRegistry;

/// Shared store of ingestion task state.
///
/// The submitting side creates entries and polls them; workers move them
/// through their lifecycle. Polling an id that was never created yields
/// [`RegistryError::NotFound`], never a pending record.
pub trait TaskRegistry: Send + Sync + 'static {
    /// Creates a new `PENDING` entry and returns its identifier.
    fn create(&self) -> impl Future<Output = Result<TaskId, RegistryError>> + Send;
    fn set_status(&self, task_id: TaskId, status: TaskStatus) -> impl Future<Output = Result<(), RegistryError>> + Send;
    fn set_progress(&self, task_id: TaskId, progress: TaskProgress) -> impl Future<Output = Result<(), RegistryError>> + Send;
    /// Stores the terminal payload and moves the task to the matching status.
    fn set_result(&self, task_id: TaskId, outcome: TaskOutcome) -> impl Future<Output = Result<(), RegistryError>> + Send;
    fn get(&self, task_id: TaskId) -> impl Future<Output = Result<TaskRecord, RegistryError>> + Send;
}
