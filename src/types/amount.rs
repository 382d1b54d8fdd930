use crate::types::errors::AmountError;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DECIMAL_PLACES: u32 = 2;
const INTEGER_DIGITS: usize = 8;

/// A strictly positive monetary amount normalized to two decimal places.
///
/// Mirrors a `DECIMAL(10, 2)` column: at most eight integer digits and two
/// fractional digits. Values that would need rounding are rejected rather
/// than silently truncated.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units priced at this amount.
    pub fn checked_mul_quantity(self, quantity: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }
}

impl Display for Amount {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(AmountError::Missing);
        }

        let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
        let mut parts = unsigned.split('.');
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next();

        if parts.next().is_some() {
            return Err(AmountError::InvalidFormat(value.to_string()));
        }

        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());

        if integer.is_empty() || !all_digits(integer) || !fraction.is_none_or(all_digits) {
            return Err(AmountError::InvalidFormat(value.to_string()));
        }

        if fraction.is_some_and(|fraction| fraction.len() > DECIMAL_PLACES as usize) {
            return Err(AmountError::TooManyDecimalPlaces(value.to_string()));
        }

        if integer.trim_start_matches('0').len() > INTEGER_DIGITS {
            return Err(AmountError::OutOfRange(value.to_string()));
        }

        let sign = if value.starts_with('-') { "-" } else { "" };
        let fraction = fraction.filter(|fraction| !fraction.is_empty()).unwrap_or("0");
        let mut decimal = Decimal::from_str(&format!("{sign}{integer}.{fraction}"))
            .map_err(|_| AmountError::InvalidFormat(value.to_string()))?;

        if decimal <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value.to_string()));
        }

        decimal.rescale(DECIMAL_PLACES);

        Ok(Amount(decimal))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
