use crate::reports::errors::QueryError;
use crate::types::{Currency, DateRange};
use std::str::FromStr;

/// Number of leaderboard entries to return. Always in `1..=50`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Limit(usize);

impl Limit {
    pub const DEFAULT: Limit = Limit(10);
    pub const MAX: usize = 50;

    /// Rejects non-positive values and clamps anything above [`Limit::MAX`].
    pub fn new(value: i64) -> Result<Self, QueryError> {
        if value <= 0 {
            return Err(QueryError::InvalidLimit(value.to_string()));
        }

        let value = usize::try_from(value).unwrap_or(Self::MAX);

        Ok(Limit(value.min(Self::MAX)))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Limit {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        value.parse::<i64>()
            .map_err(|_| QueryError::InvalidLimit(value.to_string()))
            .and_then(Limit::new)
    }
}

/// Parameters shared by the top-customers and top-products rankings.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct LeaderboardQuery {
    pub limit: Limit,
    pub range: DateRange,
    /// Restricts the ranking to a single currency when set.
    pub currency: Option<Currency>
}

impl LeaderboardQuery {
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
}
