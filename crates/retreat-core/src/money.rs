//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats, a line of 3 books at $10.00 re-priced to 2 books can     │
//! │  drift: 30.0 / 3 * 2 = 19.999999999999996                              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3000 cents × 2 / 3 = 2000 cents, rounded half-up when inexact       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use retreat_core::money::Money;
//!
//! let total = Money::from_cents(4000); // $40.00 for 2 copies
//! assert_eq!(total.div_round_half_up(2), Some(Money::from_cents(2000)));
//! assert_eq!(total.to_decimal_string(), "40.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections
/// - **Single field tuple struct**: Serializes as a bare integer
///
/// ## Where Money is Used
/// ```text
/// DisplayItem.price ──► CheckoutItem.total_price (price × qty)
///                              │
///                              ├──► ReceiptData.total_price() (sum)
///                              └──► CSV unit price (total ÷ qty, half-up)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
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

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use retreat_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1299);
    /// assert_eq!(unit_price.multiply_quantity(3), Some(Money::from_cents(3897)));
    /// assert_eq!(unit_price.multiply_quantity(i64::MAX), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Divides by a quantity, rounding half away from zero to the nearest cent.
    ///
    /// Returns `None` when `qty` is not positive.
    ///
    /// ## Example
    /// ```rust
    /// use retreat_core::money::Money;
    ///
    /// // $10.00 split three ways: 333.33 cents → 333
    /// assert_eq!(Money::from_cents(1000).div_round_half_up(3), Some(Money::from_cents(333)));
    /// // $0.05 split two ways: 2.5 cents → 3
    /// assert_eq!(Money::from_cents(5).div_round_half_up(2), Some(Money::from_cents(3)));
    /// assert_eq!(Money::from_cents(5).div_round_half_up(0), None);
    /// ```
    pub fn div_round_half_up(&self, qty: i64) -> Option<Money> {
        self.scale(1, qty)
    }

    /// Computes `self × numerator ÷ denominator`, rounding half away from zero.
    ///
    /// Used to re-price a line for a new quantity while keeping its unit
    /// price: `total.scale(new_qty, old_qty)`.
    ///
    /// Returns `None` when `denominator` is not positive.
    pub fn scale(&self, numerator: i64, denominator: i64) -> Option<Money> {
        if denominator <= 0 {
            return None;
        }

        // i128 so a large total times a large quantity cannot overflow
        let product = self.0 as i128 * numerator as i128;
        let den = denominator as i128;
        let magnitude = (2 * product.abs() + den) / (2 * den);
        let scaled = if product < 0 { -magnitude } else { magnitude };

        i64::try_from(scaled).ok().map(Money)
    }

    /// Renders the amount as a plain decimal with exactly two places.
    ///
    /// ## Example
    /// ```rust
    /// use retreat_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4000).to_decimal_string(), "40.00");
    /// assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with a dollar sign, e.g. `$12.30`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
