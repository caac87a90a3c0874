//! Time source for the engine.
//!
//! "Today" decides whether a booking starts in the past, so the coordinator
//! takes it from an injected [`Clock`] instead of reading the system time
//! directly.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

pub trait Clock: Send + Sync {
    /// Current instant, used for `created_at` / `updated_at`.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date, used for the "no bookings in the past" rule.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock. `today` follows the local calendar of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        FixedClock(instant)
    }

    /// Noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_time(NaiveTime::MIN) + chrono::Duration::hours(12);
        FixedClock(Utc.from_utc_datetime(&noon))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
