use crate::types::errors::CurrencyError;
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Currencies accepted on ingestion. Amounts are stored in the reported
/// currency and never converted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Pln,
    Usd
}

impl Currency {
    pub const SUPPORTED: [Currency; 3] = [Currency::Pln, Currency::Eur, Currency::Usd];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Pln => "PLN",
            Currency::Usd => "USD"
        }
    }
}

impl Display for Currency {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(CurrencyError::Missing);
        }

        let code = value.to_ascii_uppercase();

        Currency::SUPPORTED.into_iter()
            .find(|currency| currency.code() == code)
            .ok_or(CurrencyError::Unsupported(code))
    }
}
