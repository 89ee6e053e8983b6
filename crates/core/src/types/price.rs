//! Non-negative decimal prices.
//!
//! A price has at most two decimal places and stays below ten billion, the
//! range of a `NUMERIC(12, 2)` column.
//!
//! Prices use decimal arithmetic so that line subtotals and cart totals never
//! pick up binary floating point drift. On the wire they are JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount has more than two decimal places.
    #[error("price cannot have more than {max} decimal places (got {0})", max = Price::SCALE)]
    TooPrecise(Decimal),

    /// The amount does not fit the stored range.
    #[error("price must be at most {max} (got {0})", max = Price::MAX)]
    TooLarge(Decimal),
}

/// A non-negative amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted price.
    pub const MAX: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

    /// Decimal places a price may carry.
    pub const SCALE: u32 = 2;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero,
    /// `PriceError::TooPrecise` if it has more than two decimal places and
    /// `PriceError::TooLarge` if it exceeds [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` items at this unit price.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity.get())))
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_rejects_more_than_two_decimal_places() {
        assert!(matches!(
            Price::new(Decimal::new(149_995, 3)),
            Err(PriceError::TooPrecise(_))
        ));
        let trailing_zero = Price::new(Decimal::new(149_950, 3)).unwrap();
        assert_eq!(trailing_zero.to_string(), "149.95");

        let parsed: Result<Price, _> = serde_json::from_str("149.995");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_rejects_amounts_beyond_stored_range() {
        assert_eq!(Price::MAX, Decimal::new(999_999_999_999, 2));
        assert!(Price::new(Price::MAX).is_ok());
        assert!(matches!(
            Price::new(Decimal::new(10_000_000_000, 0)),
            Err(PriceError::TooLarge(_))
        ));

        let parsed: Result<Price, _> = serde_json::from_str("1e10");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_times_and_sum() {
        let akoya = Price::from_units(299);
        let freshwater = Price::new(Decimal::new(14_950, 2)).unwrap();

        let total: Price = [
            akoya.times(Quantity::new(2).unwrap()),
            freshwater.times(Quantity::new(1).unwrap()),
        ]
        .into_iter()
        .sum();

        assert_eq!(total.amount(), Decimal::new(74_750, 2));
        assert_eq!(total.to_string(), "747.50");
    }

    #[test]
    fn test_json_is_a_number() {
        let price = Price::from_units(599);
        let json = serde_json::to_value(price).unwrap();
        assert!(json.is_number());
        assert_eq!(json.as_f64(), Some(599.0));

        let parsed: Price = serde_json::from_str("899.5").unwrap();
        assert_eq!(parsed.amount(), Decimal::new(8995, 1));

        let negative: Result<Price, _> = serde_json::from_str("-3");
        assert!(negative.is_err());
    }
}
