use crate::models::{TaskOutcome, TaskProgress, TaskRecord, TaskStatus, TransitionError};
use crate::registry::{RegistryError, TaskRegistry};
use crate::types::TaskId;
use dashmap::DashMap;

/// Registry kept in process memory. Suitable when the submitter and the
/// workers share one process, and for tests.
pub struct MemoryTaskRegistry {
    tasks: DashMap<TaskId, TaskRecord>
}

impl MemoryTaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new()
        }
    }

    fn update<F>(&self, task_id: TaskId, change: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut TaskRecord) -> Result<(), TransitionError>
    {
        let mut record = self.tasks.get_mut(&task_id)
            .ok_or(RegistryError::NotFound(task_id))?;

        change(record.value_mut())?;

        Ok(())
    }
}

impl Default for MemoryTaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry for MemoryTaskRegistry {
    async fn create(&self) -> Result<TaskId, RegistryError> {
        let task_id = TaskId::generate();
        self.tasks.insert(task_id, TaskRecord::new(task_id));

        Ok(task_id)
    }

    async fn set_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), RegistryError> {
        self.update(task_id, |record| record.transition(status))
    }

    async fn set_progress(&self, task_id: TaskId, progress: TaskProgress) -> Result<(), RegistryError> {
        self.update(task_id, |record| {
            record.record_progress(progress);
            Ok(())
        })
    }

    async fn set_result(&self, task_id: TaskId, outcome: TaskOutcome) -> Result<(), RegistryError> {
        self.update(task_id, |record| record.complete(outcome))
    }

    async fn get(&self, task_id: TaskId) -> Result<TaskRecord, RegistryError> {
        self.tasks.get(&task_id)
            .map(|record| record.value().clone())
            .ok_or(RegistryError::NotFound(task_id))
    }
}
