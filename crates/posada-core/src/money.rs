//! # Money Module
//!
//! Provides the `Money` and `ExchangeRate` types for handling monetary
//! values safely across the two operating currencies.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many billing systems:                                               │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                          │
//! │    We KNOW we lost 1 cent, and handle it explicitly                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Currencies, One Home Unit
//! Every stored amount is in home-currency cents (USD). Secondary-currency
//! amounts (Bs) are derived at entry time through an `ExchangeRate` and
//! frozen alongside the entry, never recomputed later.
//!
//! ## Usage
//! ```rust
//! use posada_core::money::{ExchangeRate, Money};
//!
//! // Create from cents (preferred)
//! let nightly = Money::from_cents(2500); // $25.00
//!
//! // Arithmetic operations
//! let two_nights = nightly * 2;                     // $50.00
//! let total = two_nights + Money::from_cents(500);  // $55.00
//!
//! // Currency conversion through a validated rate
//! let rate = ExchangeRate::from_milli(35_500).unwrap(); // 35.500 Bs/USD
//! assert_eq!(rate.to_secondary(nightly).cents(), 88_750); // Bs 887.50
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, adjustments,
///   and guest balances (negative = debt owed by the guest)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Currency-agnostic**: The same type carries home (USD) and secondary
///   (Bs) amounts; context determines which, and amounts in different
///   currencies are never mixed in one sum
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Room.price_cents ──► Folio.room_total ──► Folio.stay_total             │
/// │                                                │                        │
/// │  ExtraCharge.amount ──► Folio.extras_total ────┤                        │
/// │                                                ▼                        │
/// │  PaymentLine.amount ──► LedgerEntry.amount ──► Folio.paid_total         │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use posada_core::money::Money;
    ///
    /// let price = Money::from_cents(2500); // Represents $25.00
    /// assert_eq!(price.cents(), 2500);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents.
    /// Only the UI converts to major units for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use posada_core::money::Money;
    ///
    /// let price = Money::from_major_minor(25, 50); // $25.50
    /// assert_eq!(price.cents(), 2550);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -$5.50 (refund)
    /// assert_eq!(negative.cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
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

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns `max(self, zero)` for "amount still due" figures that must
    /// never display as negative.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use posada_core::money::Money;
    ///
    /// let nightly = Money::from_cents(2500); // $25.00
    /// let stay = nightly.multiply_quantity(3);
    /// assert_eq!(stay.cents(), 7500); // $75.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Exchange Rate Type
// =============================================================================

/// An exchange rate in milli-units of secondary currency per home unit.
///
/// `ExchangeRate::from_milli(35_500)` means 35.500 Bs per 1 USD.
///
/// ## Design Decisions
/// - **Integer milli-units**: Three decimal places match how the rate is
///   quoted and posted; no floats anywhere in the conversion path
/// - **Validated construction**: A rate of zero or below is rejected at the
///   boundary, so the division in `to_home` can never divide by zero and a
///   misconfigured rate surfaces as an error instead of silently converting
///   everything to zero
/// - **Frozen per entry**: Recorded transactions store the rate that was in
///   effect; a later rate change never rewrites history
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    /// Creates an exchange rate from milli-units (35_500 = 35.500 Bs/USD).
    ///
    /// ## Errors
    /// Returns `ValidationError::InvalidExchangeRate` if `milli <= 0`.
    pub fn from_milli(milli: i64) -> Result<Self, ValidationError> {
        if milli <= 0 {
            return Err(ValidationError::InvalidExchangeRate { milli });
        }
        Ok(ExchangeRate(milli))
    }

    /// Returns the rate in milli-units.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Converts a home-currency amount to the secondary currency.
    ///
    /// Half-up rounding in i128 to prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use posada_core::money::{ExchangeRate, Money};
    ///
    /// let rate = ExchangeRate::from_milli(35_500).unwrap();
    /// let usd = Money::from_cents(2500); // $25.00
    /// assert_eq!(rate.to_secondary(usd).cents(), 88_750); // Bs 887.50
    /// ```
    pub fn to_secondary(&self, home: Money) -> Money {
        // cents * milli / 1000, rounded half-up
        let cents = (home.cents() as i128 * self.0 as i128 + 500) / 1000;
        Money::from_cents(cents as i64)
    }

    /// Converts a secondary-currency amount back to the home currency.
    ///
    /// ## Example
    /// ```rust
    /// use posada_core::money::{ExchangeRate, Money};
    ///
    /// let rate = ExchangeRate::from_milli(35_500).unwrap();
    /// let bs = Money::from_cents(88_750); // Bs 887.50
    /// assert_eq!(rate.to_home(bs).cents(), 2500); // $25.00
    /// ```
    pub fn to_home(&self, secondary: Money) -> Money {
        // cents * 1000 / milli, rounded half-up
        // Construction guarantees self.0 > 0
        let cents = (secondary.cents() as i128 * 1000 + self.0 as i128 / 2) / self.0 as i128;
        Money::from_cents(cents as i64)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and receipts. The UI handles localization and the
/// secondary-currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(2599);
        assert_eq!(money.cents(), 2599);
        assert_eq!(money.major(), 25);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(25, 99);
        assert_eq!(money.cents(), 2599);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(2599)), "$25.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
        assert_eq!(negative.clamp_non_negative().cents(), 0);
        assert_eq!(positive.clamp_non_negative().cents(), 100);
    }

    #[test]
    fn test_multiply_quantity() {
        let nightly = Money::from_cents(2500);
        let stay = nightly.multiply_quantity(3);
        assert_eq!(stay.cents(), 7500);
    }

    #[test]
    fn test_rate_rejects_non_positive() {
        assert!(ExchangeRate::from_milli(0).is_err());
        assert!(ExchangeRate::from_milli(-35_500).is_err());
        assert!(ExchangeRate::from_milli(1).is_ok());
    }

    #[test]
    fn test_rate_display() {
        let rate = ExchangeRate::from_milli(35_500).unwrap();
        assert_eq!(format!("{}", rate), "35.500");

        let rate = ExchangeRate::from_milli(1_050).unwrap();
        assert_eq!(format!("{}", rate), "1.050");
    }

    #[test]
    fn test_to_secondary() {
        let rate = ExchangeRate::from_milli(35_500).unwrap();
        // $25.00 × 35.500 = Bs 887.50
        assert_eq!(rate.to_secondary(Money::from_cents(2500)).cents(), 88_750);
        // $0.01 × 35.500 = Bs 0.355 → rounds to Bs 0.36
        assert_eq!(rate.to_secondary(Money::from_cents(1)).cents(), 36);
    }

    #[test]
    fn test_to_home() {
        let rate = ExchangeRate::from_milli(35_500).unwrap();
        // Bs 887.50 ÷ 35.500 = $25.00
        assert_eq!(rate.to_home(Money::from_cents(88_750)).cents(), 2500);
        // Bs 1.00 ÷ 35.500 = $0.028... → rounds to $0.03
        assert_eq!(rate.to_home(Money::from_cents(100)).cents(), 3);
    }

    /// Round-trip conversion: to_secondary then to_home lands within
    /// one cent of the original amount.
    #[test]
    fn test_round_trip_within_one_cent() {
        let rates = [1_000, 6_350, 35_500, 36_123, 999_999];
        let amounts = [1, 99, 100, 2_500, 4_000, 15_000, 123_456, 9_999_999];

        for &milli in &rates {
            let rate = ExchangeRate::from_milli(milli).unwrap();
            for &cents in &amounts {
                let original = Money::from_cents(cents);
                let back = rate.to_home(rate.to_secondary(original));
                let drift = (back.cents() - original.cents()).abs();
                assert!(
                    drift <= 1,
                    "rate {} amount {} drifted by {} cents",
                    milli,
                    cents,
                    drift
                );
            }
        }
    }
}
