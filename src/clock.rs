//! Clock helpers shared by the board services.
//!
//! Production callers use [`mockable::DefaultClock`]. [`ManualClock`] pins the
//! current instant so habit generation can be replayed for a chosen day.
//! `mockable`'s `MockClock` answers from fixed expectations; this one is shared
//! through an `Arc` and moved forward between calls, so several services see
//! the same day change.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, Utc};
use mockable::Clock;
use std::sync::{PoisonError, RwLock};

/// Returns the UTC calendar date reported by `clock`.
///
/// Recurrence works at date granularity; the time of day is discarded.
#[must_use]
pub fn today(clock: &impl Clock) -> NaiveDate {
    clock.utc().date_naive()
}

/// Clock whose current instant is set explicitly.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Creates a clock frozen at midday UTC on `date`.
    #[must_use]
    pub fn at_date(date: NaiveDate) -> Self {
        let midday = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(date.and_time(midday).and_utc())
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
