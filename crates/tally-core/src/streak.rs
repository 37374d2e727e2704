//! The streak engine.
//!
//! [`evaluate_checkoff`] decides what a check-off does to a streak given the
//! habit's periodicity, the date of the last recorded completion, and the
//! caller's notion of "today". [`Streaks::apply`] folds that decision into the
//! counters. Neither touches storage or the wall clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, habit::Periodicity};

/// Largest gap, in calendar days, that still extends a weekly streak.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

// ─── Decision ────────────────────────────────────────────────────────────────

/// Why a check-off was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
  /// A completion is already recorded for today.
  DuplicateToday,
}

/// The outcome of evaluating a check-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
  /// The completion continues the current streak (or starts the first one).
  Extend,
  /// The gap since the last completion broke the streak; it restarts at 1.
  Reset,
  /// Nothing is recorded and no counter changes.
  Reject(Rejection),
}

impl Decision {
  /// `true` unless the check-off was rejected.
  pub fn is_accepted(&self) -> bool { !matches!(self, Self::Reject(_)) }

  pub fn is_reset(&self) -> bool { matches!(self, Self::Reset) }
}

/// Decide whether a check-off on `today` extends, resets, or is rejected.
///
/// Gaps are whole calendar days. A daily habit extends only when the last
/// completion was yesterday; a weekly habit extends when it falls anywhere in
/// `[today - 7, today - 1]`. A last completion dated after `today` is treated
/// like any other non-qualifying gap and resets.
pub fn evaluate_checkoff(
  periodicity: Periodicity,
  last_completed: Option<NaiveDate>,
  today: NaiveDate,
) -> Decision {
  let Some(last) = last_completed else {
    return Decision::Extend;
  };

  let gap = today.signed_duration_since(last).num_days();
  if gap == 0 {
    return Decision::Reject(Rejection::DuplicateToday);
  }

  let extends = match periodicity {
    Periodicity::Daily => gap == 1,
    Periodicity::Weekly => (1..=WEEKLY_WINDOW_DAYS).contains(&gap),
  };

  if extends { Decision::Extend } else { Decision::Reset }
}

// ─── Streak counters ─────────────────────────────────────────────────────────

/// Current and longest streak for one subscription.
///
/// Always satisfies `current <= longest`; [`Streaks::new`] refuses anything
/// else and [`Streaks::apply`] preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streaks {
  #[serde(rename = "current_streak")]
  pub current: u32,
  #[serde(rename = "longest_streak")]
  pub longest: u32,
}

impl Streaks {
  /// Build counters from stored values, checking the ordering invariant.
  pub fn new(current: u32, longest: u32) -> Result<Self> {
    if current > longest {
      return Err(Error::InvariantViolation(format!(
        "current streak {current} exceeds longest streak {longest}"
      )));
    }
    Ok(Self { current, longest })
  }

  /// Fold a decision into the counters.
  ///
  /// `Extend` adds one, `Reset` restarts at one, and the longest streak is
  /// raised to the new current value when it is exceeded. It never drops.
  #[must_use]
  pub fn apply(self, decision: Decision) -> Self {
    let current = match decision {
      Decision::Extend => self.current.saturating_add(1),
      Decision::Reset => 1,
      Decision::Reject(_) => return self,
    };
    Self { current, longest: self.longest.max(current) }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
