use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use std::io::Read;

use crate::models::{EXPECTED_COLUMNS, RawRow, RowError, ValidationError};
use crate::parser::errors::ParseError;

const COLUMN_COUNT: usize = EXPECTED_COLUMNS.len();

/// One item pulled from the stream: either a row ready for validation or a
/// record the CSV layer already rejected (wrong field count, bad encoding).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParsedRecord {
    Row(RawRow),
    Rejected(ValidationError)
}

impl ParsedRecord {
    pub fn line_number(&self) -> u64 {
        match self {
            ParsedRecord::Row(row) => row.line_number,
            ParsedRecord::Rejected(error) => error.line_number
        }
    }
}

/// Incremental reader over a transactions CSV.
///
/// The header is verified on construction. Rows are read one at a time into
/// a reused buffer, so memory stays flat regardless of file size. Once an
/// unrecoverable error is yielded the stream ends.
pub struct CsvRowStream<R: Read> {
    reader: csv::Reader<R>,
    columns: [usize; COLUMN_COUNT],
    record: StringRecord,
    exhausted: bool
}

impl<R: Read> CsvRowStream<R> {
    pub fn new(source: R) -> Result<Self, ParseError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()
            .map_err(|error| ParseError::Unreadable(error.to_string()))?;
        let columns = resolve_columns(headers)?;

        Ok(Self {
            reader,
            columns,
            record: StringRecord::new(),
            exhausted: false
        })
    }

    fn resolve_row(&self, line_number: u64) -> ParsedRecord {
        if self.record.len() != COLUMN_COUNT {
            return ParsedRecord::Rejected(ValidationError {
                line_number,
                reason: RowError::FieldCount { expected: COLUMN_COUNT, found: self.record.len() }
            });
        }

        let field = |slot: usize| self.record.get(self.columns[slot]).unwrap_or_default().to_string();

        ParsedRecord::Row(RawRow {
            line_number,
            transaction_id: field(0),
            timestamp: field(1),
            amount: field(2),
            currency: field(3),
            customer_id: field(4),
            product_id: field(5),
            quantity: field(6)
        })
    }
}

impl<R: Read> Iterator for CsvRowStream<R> {
    type Item = Result<ParsedRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let line_number = self.record.position().map(|position| position.line()).unwrap_or_default();
                Some(Ok(self.resolve_row(line_number)))
            }
            Ok(false) => {
                self.exhausted = true;
                None
            }
            Err(error) => match error.kind() {
                ErrorKind::Utf8 { pos, .. } => Some(Ok(ParsedRecord::Rejected(ValidationError {
                    line_number: pos.as_ref().map(|position| position.line()).unwrap_or_default(),
                    reason: RowError::Malformed("invalid UTF-8".to_string())
                }))),
                ErrorKind::UnequalLengths { pos, len, .. } => Some(Ok(ParsedRecord::Rejected(ValidationError {
                    line_number: pos.as_ref().map(|position| position.line()).unwrap_or_default(),
                    reason: RowError::FieldCount { expected: COLUMN_COUNT, found: *len as usize }
                }))),
                _ => {
                    self.exhausted = true;
                    Some(Err(ParseError::Unreadable(error.to_string())))
                }
            }
        }
    }
}

/// Maps each expected column to its position in the header. The header must
/// name every expected column exactly once and nothing else.
fn resolve_columns(headers: &StringRecord) -> Result<[usize; COLUMN_COUNT], ParseError> {
    if headers.iter().all(str::is_empty) {
        return Err(ParseError::MissingHeader);
    }

    let mut positions: [Option<usize>; COLUMN_COUNT] = [None; COLUMN_COUNT];
    let mut unexpected = Vec::new();
    let mut duplicated = Vec::new();

    for (index, name) in headers.iter().enumerate() {
        match EXPECTED_COLUMNS.iter().position(|column| *column == name) {
            Some(slot) if positions[slot].is_none() => positions[slot] = Some(index),
            Some(_) => duplicated.push(name),
            None => unexpected.push(name)
        }
    }

    let missing: Vec<&str> = EXPECTED_COLUMNS.iter()
        .zip(positions.iter())
        .filter(|(_, position)| position.is_none())
        .map(|(column, _)| *column)
        .collect();

    if !missing.is_empty() {
        return Err(ParseError::MissingColumns(missing.join(", ")));
    }

    if !duplicated.is_empty() {
        return Err(ParseError::DuplicateColumns(duplicated.join(", ")));
    }

    if !unexpected.is_empty() {
        return Err(ParseError::UnexpectedColumns(unexpected.join(", ")));
    }

    Ok(positions.map(Option::unwrap_or_default))
}
