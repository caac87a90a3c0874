//! # Money Module
//!
//! Provides the `Money` type used for daily rates, quotes and rental totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  A rental total is `daily_rate × days`. With floats, a 45.10/day car    │
//! │  booked for 30 days can drift by fractions of a cent.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    4510 cents × 30 days = 135300 cents, exactly                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fleet_core::money::Money;
//!
//! let rate = Money::from_cents(5000); // $50.00 per day
//! let total = rate.checked_times(3).unwrap();
//! assert_eq!(total.cents(), 15000);
//!
//! let parsed: Money = "45.50".parse().unwrap();
//! assert_eq!(parsed.cents(), 4550);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money Is Used
/// ```text
/// Asset.daily_rate_cents ──► compute_cost(rate, start, end) ──► Rental.total_cost_cents
///                                      │
///                                      └──► compute_quote() preview
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use fleet_core::money::Money;
    ///
    /// let rate = Money::from_cents(4000); // $40.00
    /// assert_eq!(rate.cents(), 4000);
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

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a whole count (e.g. number of rental days).
    ///
    /// Returns `None` on overflow instead of wrapping.
    ///
    /// ```rust
    /// use fleet_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4510).checked_times(30), Some(Money::from_cents(135300)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    /// ```
    #[inline]
    pub const fn checked_times(&self, count: i64) -> Option<Money> {
        match self.0.checked_mul(count) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display ("$150.00"). Localised formatting belongs to the caller.
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

/// Parses decimal strings such as `"50"`, `"45.5"` or `"40.00"`.
///
/// ## Rules
/// - Optional leading `-`
/// - At most two fractional digits (no silent rounding)
/// - An optional leading `$` is accepted for convenience
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);

        if rest.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (major_str, minor_str) = match rest.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (rest, ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places are allowed"));
        }

        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => minor_str.parse::<i64>().map_err(|_| invalid("bad cents"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
