//! The reference clock.
//!
//! Check-offs are dated by whoever calls the store, never by the store itself.
//! Production code asks a [`SystemClock`]; tests pin the date with a
//! [`FixedClock`].

use std::sync::{Mutex, PoisonError};

use chrono::{Days, NaiveDate, Utc};

/// Source of "today" as a calendar date.
pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

/// The UTC calendar date of the host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Utc::now().date_naive() }
}

/// A clock that reports a settable date.
#[derive(Debug)]
pub struct FixedClock {
  date: Mutex<NaiveDate>,
}

impl FixedClock {
  pub fn new(date: NaiveDate) -> Self { Self { date: Mutex::new(date) } }

  pub fn set(&self, date: NaiveDate) {
    *self.date.lock().unwrap_or_else(PoisonError::into_inner) = date;
  }

  /// Move the clock forward by `days` calendar days.
  pub fn advance(&self, days: u64) {
    let mut date = self.date.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(next) = date.checked_add_days(Days::new(days)) {
      *date = next;
    }
  }
}

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    *self.date.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
