//! # Pricing
//!
//! Rental cost is `daily_rate × days`, where a rental covers both boundary
//! days:
//!
//! ```text
//!   start 2024-01-01          end 2024-01-03
//!        │                         │
//!        ▼                         ▼
//!   ┌─────────┬─────────┬─────────┐
//!   │  day 1  │  day 2  │  day 3  │   days = (end - start) + 1 = 3
//!   └─────────┴─────────┴─────────┘
//!   50.00/day ──────────────────────► 150.00
//! ```
//!
//! Same-day returns are billed as one day.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Number of billed days in the inclusive range `start..=end`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use fleet_core::pricing::rental_days;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
/// assert_eq!(rental_days(d(1), d(1)).unwrap(), 1);
/// assert_eq!(rental_days(d(1), d(3)).unwrap(), 3);
/// assert!(rental_days(d(3), d(1)).is_err());
/// ```
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> CoreResult<i64> {
    if end < start {
        return Err(CoreError::InvalidRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Computes the total cost of renting at `daily_rate` from `start` to `end`
/// inclusive.
///
/// ## Errors
/// - `InvalidRange` when `end < start`
/// - `Validation` when the rate is negative or the total overflows
///
/// ```rust
/// use chrono::NaiveDate;
/// use fleet_core::money::Money;
/// use fleet_core::pricing::compute_cost;
///
/// let cost = compute_cost(
///     Money::from_cents(5000),
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
/// )
/// .unwrap();
/// assert_eq!(cost, Money::from_cents(15000));
/// ```
pub fn compute_cost(daily_rate: Money, start: NaiveDate, end: NaiveDate) -> CoreResult<Money> {
    if daily_rate.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "daily_rate".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into());
    }

    let days = rental_days(start, end)?;

    daily_rate.checked_times(days).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "total_cost".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into()
    })
}
