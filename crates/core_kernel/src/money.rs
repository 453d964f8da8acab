//! Integer currency amounts
//!
//! Receivables are tracked in the smallest whole currency unit (won), so an
//! [`Amount`] wraps an `i64` and never carries a fractional part. Ratios are
//! the only place where division happens; they are computed with
//! `rust_decimal` so the rounding at `.5` boundaries is exact and does not
//! depend on floating-point behaviour.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// Errors that can occur during amount operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Overflow during calculation")]
    Overflow,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// A signed amount in the smallest whole currency unit
///
/// Amounts are signed on purpose: an overpaid transaction has a negative
/// unpaid amount and that value must stay observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Creates an amount from whole currency units
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Returns the raw unit count
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the amount, or zero when it is negative
    pub fn clamp_non_negative(&self) -> Self {
        Self(self.0.max(0))
    }

    /// Checked addition
    pub fn checked_add(&self, other: Amount) -> Result<Amount, MoneyError> {
        self.0.checked_add(other.0).map(Amount).ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: Amount) -> Result<Amount, MoneyError> {
        self.0.checked_sub(other.0).map(Amount).ok_or(MoneyError::Overflow)
    }

    /// Formats the amount with `,` thousands separators (e.g. `1,234,500`)
    pub fn grouped(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> i64 {
        amount.0
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Integer percentage of `whole` represented by `part`
///
/// Returns `round(part / whole * 100)` rounding half away from zero, or `0`
/// when `whole` is zero. The result is not clamped: an overpayment yields a
/// value above 100 and a negative `whole` yields a negative percentage.
pub fn percentage(part: Amount, whole: Amount) -> i64 {
    if whole.is_zero() {
        return 0;
    }

    let scaled = Decimal::from(part.units()) * dec!(100);
    scaled
        .checked_div(Decimal::from(whole.units()))
        .map(|ratio| ratio.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .unwrap_or(0)
}

/// Mean of integer values rounded half away from zero; `0` for no values
pub fn rounded_mean(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let total: Decimal = values.iter().map(|v| Decimal::from(*v)).sum();
    (total / Decimal::from(values.len()))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::new(10_000);
        let b = Amount::new(3_000);

        assert_eq!(a + b, Amount::new(13_000));
        assert_eq!(a - b, Amount::new(7_000));
        assert_eq!(b - a, Amount::new(-7_000));
        assert_eq!(-a, Amount::new(-10_000));
    }

    #[test]
    fn test_amount_sum() {
        let total: Amount = [1_000, 2_000, 3_000].into_iter().map(Amount::new).sum();
        assert_eq!(total, Amount::new(6_000));

        let empty: Amount = Vec::<Amount>::new().into_iter().sum();
        assert_eq!(empty, Amount::ZERO);
    }

    #[test]
    fn test_grouped_display() {
        assert_eq!(Amount::new(0).grouped(), "0");
        assert_eq!(Amount::new(999).grouped(), "999");
        assert_eq!(Amount::new(1_000).grouped(), "1,000");
        assert_eq!(Amount::new(15_000_000).grouped(), "15,000,000");
        assert_eq!(Amount::new(-1_234_567).grouped(), "-1,234,567");
    }

    #[test]
    fn test_percentage_boundaries() {
        assert_eq!(percentage(Amount::new(1), Amount::new(3)), 33);
        assert_eq!(percentage(Amount::new(2), Amount::new(3)), 67);
        assert_eq!(percentage(Amount::new(1), Amount::new(2)), 50);
        assert_eq!(percentage(Amount::new(5), Amount::new(0)), 0);
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        // 1 / 200 * 100 = 0.5
        assert_eq!(percentage(Amount::new(1), Amount::new(200)), 1);
        assert_eq!(percentage(Amount::new(1), Amount::new(-200)), -1);
        // 5 / 8 * 100 = 62.5
        assert_eq!(percentage(Amount::new(5), Amount::new(8)), 63);
    }

    #[test]
    fn test_checked_overflow() {
        let max = Amount::new(i64::MAX);
        assert_eq!(max.checked_add(Amount::new(1)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(&[]), 0);
        assert_eq!(rounded_mean(&[50, 51]), 51);
        assert_eq!(rounded_mean(&[10, 20, 30]), 20);
    }
}
