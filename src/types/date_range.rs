use crate::types::errors::DateRangeError;
use chrono::{DateTime, NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-date bounds. A missing bound leaves that side open.
///
/// Timestamps are compared by their UTC calendar date, so an `end` of
/// `2024-12-31` keeps everything up to `2024-12-31T23:59:59.999Z`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, DateRangeError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(DateRangeError::Inverted { start, end });
            }
        }

        Ok(Self { start, end })
    }

    /// Parses optional `YYYY-MM-DD` bounds as they arrive from a query string.
    /// Blank values count as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        Self::new(parse_bound("start_date", start)?, parse_bound("end_date", end)?)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();

        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

fn parse_bound(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, DateRangeError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| DateRangeError::InvalidDate { field, value: value.to_string() })
    }
}
