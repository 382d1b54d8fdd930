mod csv_stream;
mod errors;

pub use csv_stream::{CsvRowStream, ParsedRecord};
pub use errors::ParseError;
