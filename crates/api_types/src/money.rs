use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Errors raised while parsing or computing a [`Money`] amount.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount")]
    Invalid,
    #[error("too many decimals")]
    TooManyDecimals,
    #[error("amount too large")]
    Overflow,
}

/// Fixed-point money amount represented as **integer cents**.
///
/// Every price, subtotal and grand total goes through this type so that
/// totals over many lines never drift the way binary floating point would.
///
/// On the wire the amount is a decimal string with two fractional digits:
///
/// ```rust
/// use api_types::Money;
///
/// let price = Money::new(10_00);
/// assert_eq!(price.to_string(), "10.00");
/// assert_eq!(price.checked_mul(3), Some(Money::new(30_00)));
/// assert_eq!("10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked multiplication by an integer quantity (returns `None` on overflow).
    #[must_use]
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Sums amounts, returning `None` if the total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most two fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(MoneyError::Empty);
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or(MoneyError::Invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(MoneyError::Invalid);
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyError::Invalid);
        }

        let units: i64 = units_str.parse().map_err(|_| MoneyError::Overflow)?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(MoneyError::Invalid);
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| MoneyError::Invalid)? * 10,
                    2 => frac.parse::<i64>().map_err(|_| MoneyError::Invalid)?,
                    _ => return Err(MoneyError::TooManyDecimals),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(MoneyError::Overflow)?;

        if negative {
            total.checked_neg().map(Money).ok_or(MoneyError::Overflow)
        } else {
            Ok(Money(total))
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl de::Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most two fractional digits")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100).map(Money).ok_or_else(|| E::custom(MoneyError::Overflow))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom(MoneyError::Overflow))
    }

    // JSON numbers such as `10.5` arrive as f64; going through the shortest
    // round-trip representation keeps `10.01` exact.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom(MoneyError::Invalid));
        }
        self.visit_str(&v.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().cents(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert_eq!("12.345".parse::<Money>(), Err(MoneyError::TooManyDecimals));
        assert_eq!("".parse::<Money>(), Err(MoneyError::Empty));
        assert_eq!("1.2.3".parse::<Money>(), Err(MoneyError::Invalid));
    }

    #[test]
    fn sum_of_many_tenths_is_exact() {
        let total = Money::checked_sum(std::iter::repeat_n(Money::new(10), 1_000)).unwrap();
        assert_eq!(total, Money::new(10_000));
        assert_eq!(total.to_string(), "100.00");
    }

    #[test]
    fn checked_ops_detect_overflow() {
        assert_eq!(Money::new(i64::MAX).checked_mul(2), None);
        assert_eq!(Money::checked_sum([Money::new(i64::MAX), Money::new(1)]), None);
    }

    #[test]
    fn json_accepts_strings_and_numbers() {
        let from_str: Money = serde_json::from_str("\"10.00\"").unwrap();
        let from_int: Money = serde_json::from_str("10").unwrap();
        let from_float: Money = serde_json::from_str("10.01").unwrap();
        assert_eq!(from_str, Money::new(1000));
        assert_eq!(from_int, Money::new(1000));
        assert_eq!(from_float, Money::new(1001));
        assert!(serde_json::from_str::<Money>("0.001").is_err());
        assert_eq!(serde_json::to_string(&Money::new(5000)).unwrap(), "\"50.00\"");
    }
}
