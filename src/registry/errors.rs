use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::TransitionError;
use crate::types::TaskId;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Task registry I/O failed at [{path}]: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error
    },
    #[error("Task registry entry [{path}] is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error
    }
}

impl RegistryError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt { path: path.into(), source }
    }
}
