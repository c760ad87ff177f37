//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. The store trades in
//! a single currency, so no currency tag is carried.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

/// A monetary amount in cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents.
    pub amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn new(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use mart_commerce::Money;
    /// let price = Money::from_decimal(49.99);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::new((amount * 100.0).round() as i64)
    }

    /// Parse user input such as `"10"`, `"4.5"` or `"$12.30"`.
    ///
    /// Returns `None` for anything that is not a finite number.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        let amount: f64 = digits.parse().ok()?;
        if !amount.is_finite() {
            return None;
        }
        Some(Self::from_decimal(amount))
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}${}", sign, self.abs_amount())
    }

    /// Format without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}", sign, self.abs_amount())
    }

    fn abs_amount(&self) -> String {
        let cents = self.amount_cents.unsigned_abs();
        format!("{}.{:02}", cents / 100, cents % 100)
    }

    /// Try to add another Money value, returning None on overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(Money::new)
    }

    /// Try to multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_cents.checked_mul(factor).map(Money::new)
    }

    /// Sum an iterator of Money values, returning None on overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>) -> Option<Money> {
        iter.try_fold(Money::zero(), |acc, m| acc.try_add(m))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount_cents + other.amount_cents)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        Money::new(self.amount_cents * factor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99).amount_cents, 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).amount_cents, 30);
    }

    #[test]
    fn test_money_parse() {
        assert_eq!(Money::parse("10"), Some(Money::new(1000)));
        assert_eq!(Money::parse(" $4.5 "), Some(Money::new(450)));
        assert_eq!(Money::parse("-1"), Some(Money::new(-100)));
        assert_eq!(Money::parse("ten"), None);
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("inf"), None);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4000).display(), "$40.00");
        assert_eq!(Money::new(5).display_amount(), "0.05");
        assert_eq!(Money::new(-250).display(), "-$2.50");
        assert_eq!(Money::new(1999).to_string(), "$19.99");
    }

    #[test]
    fn test_money_arithmetic() {
        let line = Money::new(1000) * 2;
        assert_eq!(line + Money::new(500), Money::new(2500));
        assert_eq!(Money::new(i64::MAX).try_multiply(2), None);
    }

    #[test]
    fn test_money_try_sum() {
        let amounts = [Money::new(2000), Money::new(500), Money::new(1500)];
        assert_eq!(Money::try_sum(amounts.iter()), Some(Money::new(4000)));
        assert_eq!(Money::try_sum([Money::new(i64::MAX), Money::new(1)].iter()), None);
    }
}
