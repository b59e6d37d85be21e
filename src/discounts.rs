//! Discounts.
//!
//! Two independent discount policies coexist in the marketplace:
//!
//! 1. **Explicit** — a farmer-authored package carries whatever percentage
//!    the farmer typed in.
//! 2. **Tiered** — a buyer-assembled package derives its rate from the
//!    selection: 5 or more distinct items take 25%, else 3 or more take 15%,
//!    else a subtotal of at least 20,000 minor units takes 10%, else nothing.
//!    Only the first matching tier applies; tiers never stack.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

use crate::prices::Price;

/// Subtotal at which the lowest tier of the buyer-package discount kicks in.
pub const TIER_SUBTOTAL_THRESHOLD: Price = Price::from_minor(20_000);

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Price arithmetic left the representable range.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// How a package's discount rate is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountPolicy {
    /// Farmer-authored package: the rate is supplied by the author as-is.
    Explicit(Percentage),

    /// Buyer-assembled package: the rate is derived from the selection by
    /// the fixed tier rule.
    Tiered,
}

impl DiscountPolicy {
    /// Resolve the rate for a selection of `distinct_items` entries with the
    /// given subtotal.
    #[must_use]
    pub fn rate(&self, distinct_items: usize, subtotal: Price) -> Percentage {
        match self {
            Self::Explicit(rate) => *rate,
            Self::Tiered => tiered_rate(distinct_items, subtotal),
        }
    }
}

/// The buyer-package tier rule. First matching tier wins.
#[must_use]
pub fn tiered_rate(distinct_items: usize, subtotal: Price) -> Percentage {
    if distinct_items >= 5 {
        Percentage::from(0.25)
    } else if distinct_items >= 3 {
        Percentage::from(0.15)
    } else if subtotal >= TIER_SUBTOTAL_THRESHOLD {
        Percentage::from(0.10)
    } else {
        Percentage::from(0.0)
    }
}

/// Calculate the discount amount in minor units for a percentage of a minor
/// unit amount, rounding midpoints away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows
/// or cannot be represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: u64) -> Result<u64, DiscountError> {
    let minor = Decimal::from_u64(minor).ok_or(DiscountError::PercentConversion)?;

    // decimal_percentage doesn't expose its inner Decimal, so multiply by one.
    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}

/// The rate expressed in whole percent points, rounded to the nearest
/// integer. This is what gets stored on a synthetic package product.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the rate is not finite or
/// is negative.
pub fn percent_points(percent: &Percentage) -> Result<u64, DiscountError> {
    percent_of_minor(percent, 100)
}
