//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, completion dates are `YYYY-MM-DD`, UUIDs
//! are hyphenated lowercase strings, and streak counters are integers.

use chrono::{DateTime, NaiveDate, Utc};
use tally_core::{
  habit::{Habit, Periodicity},
  streak::Streaks,
  subscription::{Completion, Subscription, TrackedHabit},
  user::UserName,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Periodicity ─────────────────────────────────────────────────────────────

pub fn encode_periodicity(p: Periodicity) -> String { p.to_string() }

pub fn decode_periodicity(s: &str) -> Result<Periodicity> {
  s.parse()
    .map_err(|_| Error::Decode { column: "periodicity", value: s.to_owned() })
}

// ─── Streaks ─────────────────────────────────────────────────────────────────

fn decode_counter(column: &'static str, v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Decode { column, value: v.to_string() })
}

/// Decode both counters and check `current <= longest`.
pub fn decode_streaks(current: i64, longest: i64) -> Result<Streaks> {
  let current = decode_counter("current_streak", current)?;
  let longest = decode_counter("longest_streak", longest)?;
  Ok(Streaks::new(current, longest)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const HABIT_COLUMNS: &str =
  "habit_id, name, description, periodicity, created_at";

/// Raw strings read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:    String,
  pub name:        String,
  pub description: Option<String>,
  pub periodicity: String,
  pub created_at:  String,
}

impl RawHabit {
  /// Map a row selected with [`HABIT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      habit_id:    row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      periodicity: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      habit_id:    decode_uuid(&self.habit_id)?,
      name:        self.name,
      description: self.description,
      periodicity: decode_periodicity(&self.periodicity)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const SUBSCRIPTION_COLUMNS: &str =
  "subscription_id, habit_id, user_name, current_streak, longest_streak, created_at";

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub subscription_id: String,
  pub habit_id:        String,
  pub user_name:       String,
  pub current_streak:  i64,
  pub longest_streak:  i64,
  pub created_at:      String,
}

impl RawSubscription {
  /// Map a row selected with [`SUBSCRIPTION_COLUMNS`], starting at `offset`.
  pub fn from_row_at(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      subscription_id: row.get(offset)?,
      habit_id:        row.get(offset + 1)?,
      user_name:       row.get(offset + 2)?,
      current_streak:  row.get(offset + 3)?,
      longest_streak:  row.get(offset + 4)?,
      created_at:      row.get(offset + 5)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    let user_name = UserName::parse(Some(&self.user_name)).map_err(|_| {
      Error::Decode { column: "user_name", value: self.user_name.clone() }
    })?;

    Ok(Subscription {
      subscription_id: decode_uuid(&self.subscription_id)?,
      habit_id:        decode_uuid(&self.habit_id)?,
      user_name,
      streaks:         decode_streaks(self.current_streak, self.longest_streak)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// A `subscriptions` row joined with its habit's name and periodicity.
pub struct RawTrackedHabit {
  pub habit_name:   String,
  pub periodicity:  String,
  pub subscription: RawSubscription,
}

impl RawTrackedHabit {
  pub fn into_tracked(self) -> Result<TrackedHabit> {
    Ok(TrackedHabit {
      habit_name:   self.habit_name,
      periodicity:  decode_periodicity(&self.periodicity)?,
      subscription: self.subscription.into_subscription()?,
    })
  }
}

/// Raw strings read directly from a `completions` row.
pub struct RawCompletion {
  pub completion_id:   String,
  pub subscription_id: String,
  pub completed_at:    String,
}

impl RawCompletion {
  pub fn into_completion(self) -> Result<Completion> {
    Ok(Completion {
      completion_id:   decode_uuid(&self.completion_id)?,
      subscription_id: decode_uuid(&self.subscription_id)?,
      completed_at:    decode_date(&self.completed_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_sort_lexically_in_calendar_order() {
    let a = encode_date(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
    let b = encode_date(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    assert_eq!(a, "2024-09-30");
    assert!(a < b);
    assert_eq!(decode_date(&b).unwrap(), NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
  }

  #[test]
  fn periodicity_is_stored_uppercase() {
    assert_eq!(encode_periodicity(Periodicity::Weekly), "WEEKLY");
    assert_eq!(decode_periodicity("DAILY").unwrap(), Periodicity::Daily);
    assert!(matches!(
      decode_periodicity("MONTHLY"),
      Err(Error::Decode { column: "periodicity", .. })
    ));
  }

  #[test]
  fn negative_counter_is_a_decode_error() {
    assert!(matches!(
      decode_streaks(-1, 3),
      Err(Error::Decode { column: "current_streak", .. })
    ));
  }

  #[test]
  fn inverted_counters_are_an_invariant_violation() {
    assert!(matches!(
      decode_streaks(4, 2),
      Err(Error::Core(tally_core::Error::InvariantViolation(_)))
    ));
  }
}
