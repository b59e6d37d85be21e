//! Prices.
//!
//! All monetary amounts are whole minor units of the marketplace currency
//! (CFA francs, which have no fractional unit). Formatting for display is a
//! view concern and lives outside this crate.

use serde::{Deserialize, Serialize};

/// A price in whole minor units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units.
    #[must_use]
    pub const fn from_minor(value: u64) -> Self {
        Self(value)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor(self) -> u64 {
        self.0
    }

    /// Add two prices, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Subtract `other` from this price, `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// A line total: this unit price times a quantity, `None` on overflow.
    #[must_use]
    pub const fn checked_mul_quantity(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}
