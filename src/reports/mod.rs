mod errors;
mod query;
mod report_engine;
mod summary;

pub use errors::{QueryError, ReportError};
pub use query::{LeaderboardQuery, Limit};
pub use report_engine::ReportEngine;
pub use summary::{CurrencyTotal, CustomerSummary, ProductSummary, RankedEntry};
