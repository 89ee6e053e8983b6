//! Positive line-item quantities.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one.
    #[error("quantity must be at least 1 (got {0})")]
    TooSmall(i64),
    /// Quantity does not fit the storage column.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
        /// Rejected value.
        got: i64,
    },
}

/// Number of units of one pearl on a cart line. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit; the default for "add to cart".
    pub const ONE: Self = Self(1);

    /// Largest storable quantity (fits a signed 32-bit column).
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if `value` is below 1 or above [`Self::MAX`].
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::TooSmall(value));
        }
        u32::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or(QuantityError::TooLarge {
                max: Self::MAX,
                got: value,
            })
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Merge another amount into this one, capping at [`Self::MAX`].
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0).min(Self::MAX))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
