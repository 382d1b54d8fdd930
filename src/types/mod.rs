mod amount;
mod currency;
mod date_range;
mod errors;
mod task_id;

pub use amount::Amount;
pub use currency::Currency;
pub use date_range::DateRange;
pub use errors::{AmountError, CurrencyError, DateRangeError};
pub use task_id::TaskId;

use uuid::Uuid;

pub type TransactionId = Uuid;
pub type CustomerId = Uuid;
pub type ProductId = Uuid;
