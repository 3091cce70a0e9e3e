//! Fixed-point currency amounts.
//!
//! Prices, raised totals and offer amounts are stored as whole cents so that
//! funding arithmetic never accumulates floating-point drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DECIMALS: usize = 2;
const MULTIPLIER: u64 = 100;

/// Errors returned when parsing a [`Money`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    /// More than two fractional digits were supplied.
    #[error("amount must have at most two decimal places")]
    TooManyDecimals,
    /// The value was negative.
    #[error("amount must not be negative")]
    Negative,
    /// The value does not fit the supported range.
    #[error("amount is too large")]
    TooBig,
    /// The value is not a plain decimal number.
    #[error("amount must be a decimal number")]
    InvalidNumber,
}

/// Non-negative currency amount with two fractional digits.
///
/// # Examples
/// ```
/// use wishlist_backend::domain::Money;
///
/// let price: Money = "200.00".parse().expect("valid amount");
/// let raised: Money = "150".parse().expect("valid amount");
/// assert_eq!(price.cents(), 20_000);
/// assert_eq!(raised.checked_add("50.01".parse().expect("valid")).map(|m| m.to_string()),
///     Some("200.01".to_owned()));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Build an amount from whole cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Amount expressed in whole cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MULTIPLIER, self.0 % MULTIPLIER)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(MoneyParseError::Negative);
        }
        let (integer_str, fraction_str) = match trimmed.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (trimmed, None),
        };
        if integer_str.is_empty() || !integer_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidNumber);
        }
        let integer = integer_str
            .parse::<u64>()
            .map_err(|_| MoneyParseError::TooBig)?;
        let whole = integer
            .checked_mul(MULTIPLIER)
            .ok_or(MoneyParseError::TooBig)?;

        let Some(fraction_str) = fraction_str else {
            return Ok(Self(whole));
        };
        if fraction_str.is_empty() || !fraction_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidNumber);
        }
        // Trailing zeros beyond the second digit carry no value ("1.500").
        let significant = fraction_str.trim_end_matches('0');
        if significant.len() > DECIMALS {
            return Err(MoneyParseError::TooManyDecimals);
        }
        let padded = format!("{significant:0<width$}", width = DECIMALS);
        let fraction = padded
            .parse::<u64>()
            .map_err(|_| MoneyParseError::InvalidNumber)?;
        whole
            .checked_add(fraction)
            .map(Self)
            .ok_or(MoneyParseError::TooBig)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Number(serde_json::Number),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match MoneyRepr::deserialize(deserializer)? {
            MoneyRepr::Number(number) => number.to_string(),
            MoneyRepr::Text(text) => text,
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}
