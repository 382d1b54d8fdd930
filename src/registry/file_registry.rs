use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use moka::future::Cache;
use tokio::fs;
use tracing::debug;

use crate::models::{TaskOutcome, TaskProgress, TaskRecord, TaskStatus, TransitionError};
use crate::registry::{RegistryError, TaskRegistry};
use crate::types::TaskId;

const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(300);

/// Registry persisted as one JSON document per task inside a directory.
///
/// Any process pointed at the same directory can poll task state. Writes go
/// to a temporary file first and are renamed into place, so readers never see
/// a half-written entry. Terminal records never change again and are served
/// from an in-memory cache once seen.
pub struct FileTaskRegistry {
    directory: PathBuf,
    terminal_cache: Cache<TaskId, TaskRecord>
}

impl FileTaskRegistry {
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let directory = directory.into();

        fs::create_dir_all(&directory).await
            .map_err(|error| RegistryError::io(&directory, error))?;

        Ok(Self {
            directory,
            terminal_cache: build_cache(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TIMEOUT)
        })
    }

    /// Sets how many terminal records are cached and for how long.
    pub fn with_cache(mut self, capacity: u64, timeout: Duration) -> Self {
        self.terminal_cache = build_cache(capacity, timeout);
        self
    }

    fn entry_path(&self, task_id: TaskId) -> PathBuf {
        self.directory.join(format!("{task_id}.json"))
    }

    async fn read(&self, task_id: TaskId) -> Result<TaskRecord, RegistryError> {
        let path = self.entry_path(task_id);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Err(RegistryError::NotFound(task_id)),
            Err(error) => return Err(RegistryError::io(path, error))
        };

        serde_json::from_slice(&bytes).map_err(|error| RegistryError::corrupt(path, error))
    }

    async fn write(&self, record: &TaskRecord) -> Result<(), RegistryError> {
        let path = self.entry_path(record.task_id);
        let staging = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|error| RegistryError::corrupt(&path, error))?;

        fs::write(&staging, bytes).await
            .map_err(|error| RegistryError::io(&staging, error))?;
        fs::rename(&staging, &path).await
            .map_err(|error| RegistryError::io(&path, error))?;

        if record.is_ready() {
            self.terminal_cache.insert(record.task_id, record.clone()).await;
        }

        Ok(())
    }

    async fn update<F>(&self, task_id: TaskId, change: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut TaskRecord) -> Result<(), TransitionError>
    {
        let mut record = self.read(task_id).await?;
        change(&mut record)?;
        self.write(&record).await
    }
}

impl TaskRegistry for FileTaskRegistry {
    async fn create(&self) -> Result<TaskId, RegistryError> {
        let record = TaskRecord::new(TaskId::generate());
        self.write(&record).await?;

        debug!("Task [{}] registered in [{}]", record.task_id, self.directory.display());

        Ok(record.task_id)
    }

    async fn set_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), RegistryError> {
        self.update(task_id, |record| record.transition(status)).await
    }

    async fn set_progress(&self, task_id: TaskId, progress: TaskProgress) -> Result<(), RegistryError> {
        self.update(task_id, |record| {
            record.record_progress(progress);
            Ok(())
        }).await
    }

    async fn set_result(&self, task_id: TaskId, outcome: TaskOutcome) -> Result<(), RegistryError> {
        self.update(task_id, |record| record.complete(outcome)).await
    }

    async fn get(&self, task_id: TaskId) -> Result<TaskRecord, RegistryError> {
        if let Some(record) = self.terminal_cache.get(&task_id).await {
            return Ok(record);
        }

        let record = self.read(task_id).await?;

        if record.is_ready() {
            self.terminal_cache.insert(task_id, record.clone()).await;
        }

        Ok(record)
    }
}

fn build_cache(capacity: u64, timeout: Duration) -> Cache<TaskId, TaskRecord> {
    Cache::builder()
        .max_capacity(capacity)
        .time_to_live(timeout)
        .build()
}
