mod dispatcher;
mod errors;
mod ingestion_engine;
mod source;

pub use dispatcher::{IngestionDispatcher, Submission};
pub use errors::{DispatchError, IngestionError};
pub use ingestion_engine::IngestionEngine;
pub use source::IngestionSource;
