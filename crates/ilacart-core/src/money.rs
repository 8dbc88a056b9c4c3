//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing row totals in floating point:                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Storefront sends "10.50" → 1050 cents                               │
//! │    Every row total and cart aggregate is exact                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ilacart_core::money::Money;
//!
//! let price = Money::from_cents(1099);       // $10.99
//! let line = price.checked_mul(3);           // $32.97
//! assert_eq!(line, Some(Money::from_cents(3297)));
//!
//! // Arithmetic never wraps; overflow is `None`
//! assert_eq!(price.checked_mul(i64::MAX), None);
//!
//! // Caller-supplied amounts are parsed at the boundary
//! assert_eq!(Money::parse_decimal("10.50"), Some(Money::from_cents(1050)));
//! assert_eq!(Money::parse_decimal("abc"), None);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a cart subtotal can go negative once a custom
///   discount exceeds it; the type must be able to say so
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as a bare integer**: session payloads stay compact
/// - **Checked arithmetic only**: quantities and prices are caller input,
///   so every sum and product returns `Option` instead of wrapping
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ItemInput.price ("10.50") ──► CartRow.price (1050)                    │
/// │                                      │                                  │
/// │                                      ▼                                  │
/// │  CartRow.total = qty × price − qty × discount                          │
/// │                                      │                                  │
/// │                                      ▼                                  │
/// │  Cart.total = Σ row.total     Cart.subtotal = Σ row.subtotal − custom  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use ilacart_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
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

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts `other`. `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use ilacart_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.checked_mul(3), Some(Money::from_cents(897)));
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, stopping at the first overflow.
    ///
    /// An empty iterator sums to zero.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
    }

    /// Parses a decimal amount in major units ("10", "10.5", "-3.25", ".99").
    ///
    /// ## Rules
    /// - Optional leading sign, surrounding whitespace ignored
    /// - At most one decimal point; digits only otherwise
    /// - Two fractional digits are kept, the rest rounds half-up
    /// - Exponent notation is rejected
    ///
    /// Returns `None` for anything that isn't a plain decimal number or that
    /// would overflow.
    pub fn parse_decimal(input: &str) -> Option<Money> {
        let s = input.trim();
        let (negative, digits) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut cents: i64 = 0;
        for b in whole.bytes() {
            cents = cents.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        }
        cents = cents.checked_mul(100)?;

        let mut frac_digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().is_some_and(|d| d >= 5);

        cents = cents.checked_add(tenths * 10 + hundredths)?;
        if round_up {
            cents = cents.checked_add(1)?;
        }

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Parses a loosely typed JSON amount: a number or a numeric string.
    ///
    /// `null`, booleans, arrays and objects are never numeric.
    pub fn from_json(value: &Value) -> Option<Money> {
        match value {
            Value::Number(n) => Money::parse_decimal(&n.to_string()),
            Value::String(s) => Money::parse_decimal(s),
            _ => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.34`.
///
/// ## Note
/// This is for logs and debugging. Currency formatting for shoppers belongs
/// to the storefront.
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(a.checked_sub(b), Some(Money::from_cents(500)));
        assert_eq!(a.checked_mul(3), Some(Money::from_cents(3000)));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(10).checked_mul(i64::MAX / 2), None);
        assert_eq!(Money::zero().checked_mul(i64::MAX), Some(Money::zero()));
    }

    #[test]
    fn test_checked_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(250)];
        assert_eq!(Money::checked_sum(amounts), Some(Money::from_cents(350)));
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
        assert_eq!(
            Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]),
            None
        );
    }

    #[test]
    fn test_parse_decimal_accepts_plain_numbers() {
        assert_eq!(Money::parse_decimal("10"), Some(Money::from_cents(1000)));
        assert_eq!(Money::parse_decimal("10.5"), Some(Money::from_cents(1050)));
        assert_eq!(Money::parse_decimal("10.50"), Some(Money::from_cents(1050)));
        assert_eq!(Money::parse_decimal(".99"), Some(Money::from_cents(99)));
        assert_eq!(Money::parse_decimal("7."), Some(Money::from_cents(700)));
        assert_eq!(Money::parse_decimal(" 3 "), Some(Money::from_cents(300)));
        assert_eq!(Money::parse_decimal("+2"), Some(Money::from_cents(200)));
        assert_eq!(Money::parse_decimal("-3.25"), Some(Money::from_cents(-325)));
    }

    #[test]
    fn test_parse_decimal_rounds_half_up() {
        assert_eq!(Money::parse_decimal("1.005"), Some(Money::from_cents(101)));
        assert_eq!(Money::parse_decimal("1.004"), Some(Money::from_cents(100)));
        assert_eq!(Money::parse_decimal("0.129"), Some(Money::from_cents(13)));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert_eq!(Money::parse_decimal(""), None);
        assert_eq!(Money::parse_decimal("   "), None);
        assert_eq!(Money::parse_decimal("abc"), None);
        assert_eq!(Money::parse_decimal("1.2.3"), None);
        assert_eq!(Money::parse_decimal("1e3"), None);
        assert_eq!(Money::parse_decimal("-"), None);
        assert_eq!(Money::parse_decimal("."), None);
        assert_eq!(Money::parse_decimal("99999999999999999999"), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Money::from_json(&json!(10)), Some(Money::from_cents(1000)));
        assert_eq!(Money::from_json(&json!(2.5)), Some(Money::from_cents(250)));
        assert_eq!(Money::from_json(&json!("4.20")), Some(Money::from_cents(420)));
        assert_eq!(Money::from_json(&json!(null)), None);
        assert_eq!(Money::from_json(&json!(true)), None);
        assert_eq!(Money::from_json(&json!([1])), None);
        assert_eq!(Money::from_json(&json!("ten")), None);
    }
}
