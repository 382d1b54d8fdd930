use crate::config::EngineConfig;
use crate::engine::errors::DispatchError;
use crate::engine::ingestion_engine::IngestionEngine;
use crate::engine::source::IngestionSource;
use crate::models::{TaskRecord, TaskStatusView};
use crate::registry::{RegistryError, TaskRegistry};
use crate::storage::TransactionStore;
use crate::types::TaskId;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

struct IngestionJob {
    task_id: TaskId,
    source: IngestionSource
}

/// Returned to the caller as soon as a task is registered and queued.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Submission {
    pub task_id: TaskId,
    pub status: &'static str
}

/// Fixed pool of ingestion workers fed from a bounded job queue.
///
/// `submit` only registers the task and enqueues it; no row is read on the
/// caller's path. The registry is the only state shared between the caller
/// and the workers.
pub struct IngestionDispatcher<R: TaskRegistry> {
    registry: Arc<R>,
    queue: mpsc::Sender<IngestionJob>,
    workers: Vec<JoinHandle<()>>
}

impl<R: TaskRegistry> IngestionDispatcher<R> {
    /// Spawns the worker pool. Must be called from within a tokio runtime.
    pub fn start<S: TransactionStore>(engine: Arc<IngestionEngine<S, R>>, config: &EngineConfig) -> Self {
        let (queue, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..config.workers.max(1))
            .map(|worker_id| spawn_worker(worker_id, engine.clone(), receiver.clone()))
            .collect();

        Self {
            registry: engine.registry(),
            queue,
            workers
        }
    }

    /// Registers a `PENDING` task and hands it to the pool.
    ///
    /// # Errors
    /// - [`DispatchError::QueueFull`] when every queue slot is taken; no task is created.
    /// - [`DispatchError::Registry`] when the task entry cannot be written.
    pub async fn submit(&self, source: IngestionSource) -> Result<Submission, DispatchError> {
        let permit = self.queue.try_reserve().map_err(|error| match error {
            TrySendError::Full(_) => DispatchError::QueueFull,
            TrySendError::Closed(_) => DispatchError::ShuttingDown
        })?;

        let task_id = self.registry.create().await?;
        info!("Task [{task_id}] queued for {source}");
        permit.send(IngestionJob { task_id, source });

        Ok(Submission { task_id, status: "processing" })
    }

    /// Non-blocking read of a task's current state.
    pub async fn status(&self, task_id: TaskId) -> Result<TaskStatusView, RegistryError> {
        Ok(self.registry.get(task_id).await?.status_view())
    }

    /// Polls until the task reaches a terminal state.
    ///
    /// A task still `PENDING` or `STARTED` when `timeout` elapses is reported
    /// as [`DispatchError::Timeout`]; the entry itself is left untouched.
    pub async fn wait_for(&self, task_id: TaskId, poll: Duration, timeout: Duration) -> Result<TaskRecord, DispatchError> {
        let deadline = Instant::now() + timeout;

        loop {
            let record = self.registry.get(task_id).await?;

            if record.is_ready() {
                return Ok(record);
            }

            if Instant::now() >= deadline {
                return Err(DispatchError::Timeout { task_id, status: record.status });
            }

            sleep(poll).await;
        }
    }

    /// Waits for several tasks against one shared deadline.
    ///
    /// Outcomes come back in the order of `task_ids`. A stalled task yields its
    /// own [`DispatchError::Timeout`]; the remaining tasks are still collected.
    pub async fn wait_for_all(&self, task_ids: &[TaskId], poll: Duration, timeout: Duration) -> Vec<Result<TaskRecord, DispatchError>> {
        let deadline = Instant::now() + timeout;
        let mut outcomes = Vec::with_capacity(task_ids.len());

        for &task_id in task_ids {
            let remaining = deadline.saturating_duration_since(Instant::now());
            outcomes.push(self.wait_for(task_id, poll, remaining).await);
        }

        outcomes
    }

    /// Stops accepting work and waits for every worker to drain the queue.
    pub async fn shutdown(self) {
        drop(self.queue);

        for result in join_all(self.workers).await {
            if let Err(error) = result {
                error!("An ingestion worker did not shut down gracefully: {error:?}");
            }
        }
    }
}

fn spawn_worker<S: TransactionStore, R: TaskRegistry>(
    worker_id: usize,
    engine: Arc<IngestionEngine<S, R>>,
    jobs: Arc<Mutex<mpsc::Receiver<IngestionJob>>>
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let job = jobs.lock().await.recv().await;

            let Some(IngestionJob { task_id, source }) = job else {
                break;
            };

            debug!("Worker [{worker_id}] picked up task [{task_id}]");

            //NOTE: Nothing is retried here, a failed task stays failed in the registry.
            if let Err(error) = engine.ingest(task_id, source).await {
                warn!("Worker [{worker_id}] finished task [{task_id}] with error: {error}");
            }
        }

        debug!("Worker [{worker_id}] stopped");
    })
}
