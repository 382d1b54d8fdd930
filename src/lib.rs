//! Asynchronous CSV ingestion of financial transactions with pollable task
//! state and read-only aggregation reports.
//!
//! An upload is handed to an [`IngestionDispatcher`], which registers a task
//! and returns immediately. A worker then streams the file through
//! [`CsvRowStream`], validates each row on its own and stores the good ones.
//! Progress and the final report live in a [`TaskRegistry`]. The
//! [`ReportEngine`] aggregates whatever has been stored so far.

pub mod config;
pub mod engine;
pub mod models;
pub mod parser;
pub mod registry;
pub mod reports;
pub mod storage;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use config::EngineConfig;
pub use engine::{DispatchError, IngestionDispatcher, IngestionEngine, IngestionError, IngestionSource, Submission};
pub use models::{IngestionReport, TaskRecord, TaskStatus, TaskStatusView, Transaction};
pub use parser::CsvRowStream;
pub use registry::{FileTaskRegistry, MemoryTaskRegistry, RegistryError, TaskRegistry};
pub use reports::{LeaderboardQuery, Limit, QueryError, ReportEngine};
pub use storage::{TransactionFilter, TransactionStorage, TransactionStore};
