use crate::models::TaskStatus;
use crate::parser::ParseError;
use crate::registry::RegistryError;
use crate::types::TaskId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    Structural(#[from] ParseError),
    #[error("CSV reader stopped unexpectedly: {0}")]
    ReaderFailed(String),
    #[error(transparent)]
    Registry(#[from] RegistryError)
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Ingestion queue is full, try again later")]
    QueueFull,
    #[error("Ingestion dispatcher is shutting down")]
    ShuttingDown,
    #[error("Task [{task_id}] made no progress to a final state in time (last status [{status}])")]
    Timeout {
        task_id: TaskId,
        status: TaskStatus
    },
    #[error(transparent)]
    Registry(#[from] RegistryError)
}
