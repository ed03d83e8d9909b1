//! # Money Module
//!
//! Integer money and tax rates.
//!
//! Every amount in the engine is an `i64` count of the smallest currency unit
//! ("cents"). Floating point never touches a stored total, so recomputing the
//! totals of a document always yields exactly the stored values.
//!
//! ## Usage
//! ```rust
//! use rxledger_core::money::{Money, TaxRate};
//!
//! let subtotal = Money::from_cents(999);
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1800));
//!
//! // 999 × 18% = 179.82 → 180
//! assert_eq!(tax.cents(), 180);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so that intermediate results (e.g. `subtotal + tax - discount`)
/// can dip below zero before being clamped.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use rxledger_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-50).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(50).clamp_non_negative().cents(), 50);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Calculates tax with half-up rounding.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128 so
    /// large wholesale orders cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use rxledger_core::money::{Money, TaxRate};
    ///
    /// let rate = TaxRate::from_bps(1800);
    /// assert_eq!(Money::from_cents(1000).calculate_tax(rate).cents(), 180);
    /// assert_eq!(Money::from_cents(999).calculate_tax(rate).cents(), 180);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies a unit amount by a quantity, saturating at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering with two minor digits, e.g. `1234.56`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(123456).to_string(), "1234.56");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_tax_rounds_half_up() {
        let rate = TaxRate::from_bps(1800);
        // 25 × 18% = 4.5 → 5
        assert_eq!(Money::from_cents(25).calculate_tax(rate).cents(), 5);
        // 24 × 18% = 4.32 → 4
        assert_eq!(Money::from_cents(24).calculate_tax(rate).cents(), 4);
        assert_eq!(Money::zero().calculate_tax(rate).cents(), 0);
    }

    #[test]
    fn test_tax_on_large_amounts_does_not_overflow() {
        let amount = Money::from_cents(i64::MAX / 2);
        let tax = amount.calculate_tax(TaxRate::from_bps(1800));
        assert!(tax.cents() > 0);
    }

    #[test]
    fn test_sum_and_clamp() {
        let total: Money = [100, 250, -50].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 300);
        assert_eq!((Money::from_cents(100) - Money::from_cents(400)).clamp_non_negative(), Money::zero());
    }

    #[test]
    fn test_line_arithmetic_saturates() {
        let unit = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(unit.multiply_quantity(2), Money::from_cents(i64::MAX));
        assert_eq!(unit + unit, Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
    }

    #[test]
    fn test_tax_rate_percentage() {
        assert!((TaxRate::from_bps(1800).percentage() - 18.0).abs() < f64::EPSILON);
        assert_eq!(TaxRate::default(), TaxRate::zero());
    }
}
