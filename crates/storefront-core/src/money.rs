//! # Money Module
//!
//! Provides the `Money` type for prices and discount amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  COMPARING DISCOUNTS                                                    │
//! │                                                                         │
//! │  URL code:     30% of $9.99  = 299.7 cents                              │
//! │  Default code: fixed $3.00   = 300 cents                                │
//! │                                                                         │
//! │  With floats the comparison depends on representation error.           │
//! │  With integer cents both sides are rounded once, in one place,          │
//! │  and the comparison is exact: 300 vs 300 → tie → default wins.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(999);
//! assert_eq!(price.percentage_of(30).cents(), 300);
//! assert_eq!(format!("{}", price), "$9.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Signed so that differences between two amounts stay representable.
/// Serializes as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Computes `percent`% of this amount, rounded to the nearest cent.
    ///
    /// Halves round away from zero, so 12.5 cents becomes 13 and
    /// -12.5 becomes -13. This is the rounding the checkout shows buyers,
    /// and the resolver compares codes with the same numbers. Results beyond
    /// the `i64` range saturate.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).percentage_of(20).cents(), 200);
    /// assert_eq!(Money::from_cents(125).percentage_of(10).cents(), 13);
    /// assert_eq!(Money::from_cents(999).percentage_of(30).cents(), 300);
    /// ```
    pub fn percentage_of(&self, percent: u32) -> Money {
        // i128 keeps price * percent from overflowing
        let scaled = self.0 as i128 * percent as i128;
        let rounded = if scaled < 0 {
            -((-scaled + 50) / 100)
        } else {
            (scaled + 50) / 100
        };
        let saturated = i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX });
        Money(saturated)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. Localized display is the frontend's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
