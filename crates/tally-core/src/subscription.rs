//! Subscriptions and completion events.
//!
//! A subscription ties one user to one habit and owns that pair's streak
//! counters. Completions are append-only and belong to a subscription; they
//! are removed with it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  habit::Periodicity,
  streak::{Decision, Streaks},
  user::UserName,
};

/// A user tracking a habit. Unique per `(user_name, habit_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  pub habit_id:        Uuid,
  pub user_name:       UserName,
  #[serde(flatten)]
  pub streaks:         Streaks,
  pub created_at:      DateTime<Utc>,
}

/// One successful check-off. At most one exists per subscription per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
  pub completion_id:   Uuid,
  pub subscription_id: Uuid,
  pub completed_at:    NaiveDate,
}

/// A subscription joined with the habit it refers to; the read model behind
/// the per-user analytics views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedHabit {
  pub habit_name:   String,
  pub periodicity:  Periodicity,
  #[serde(flatten)]
  pub subscription: Subscription,
}

/// The result of an accepted check-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOff {
  pub completion: Completion,
  /// Either [`Decision::Extend`] or [`Decision::Reset`].
  pub decision:   Decision,
  /// Counters after the check-off was applied.
  pub streaks:    Streaks,
}
