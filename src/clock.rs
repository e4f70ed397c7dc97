// src/clock.rs

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Mutex;

/// Day-precision clock. Injected so interval scheduling and the daily
/// challenge are deterministic under test.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to a settable date, for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.today.lock().unwrap() = date;
    }

    pub fn advance_days(&self, days: i64) {
        let mut today = self.today.lock().unwrap();
        *today = *today + Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

/// Whole days since 1970-01-01, the seed for date-keyed selection.
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(NaiveDate::default()).num_days()
}
