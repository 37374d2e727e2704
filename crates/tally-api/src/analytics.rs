//! Per-user read views over subscriptions and completions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/analytics/habits/tracking/:user` | Every tracked habit with counters |
//! | `GET`  | `/analytics/user/:user/longest-streak` | Longest streak per habit, plus the overall best |
//! | `GET`  | `/analytics/user/:user/longest-streak/:name` | Longest streak for one habit |
//! | `GET`  | `/analytics/user/:user/tracked-timestamps/:name` | Completion dates, newest first |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Serialize;
use tally_core::{
  habit::Periodicity,
  store::HabitStore,
  subscription::TrackedHabit,
  user::UserName,
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct TrackedList {
  pub user:           UserName,
  pub tracked_habits: Vec<TrackedHabit>,
}

/// `GET /analytics/habits/tracking/:user`
pub async fn tracked<S>(
  State(state): State<ApiState<S>>,
  Path(user): Path<String>,
) -> Result<Json<TrackedList>, ApiError>
where
  S: HabitStore,
{
  let user = UserName::parse(Some(user.as_str()))?;
  let tracked_habits = state
    .store
    .tracked_habits(&user)
    .await
    .map_err(ApiError::classify)?;
  Ok(Json(TrackedList { user, tracked_habits }))
}

// ─── Longest streaks ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HabitLongest {
  pub habit_name:     String,
  pub periodicity:    Periodicity,
  pub longest_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct LongestStreaks {
  pub user:           UserName,
  /// Best streak across every tracked habit; 0 when nothing is tracked.
  pub longest_streak: u32,
  pub habits:         Vec<HabitLongest>,
}

/// `GET /analytics/user/:user/longest-streak`
pub async fn longest_streaks<S>(
  State(state): State<ApiState<S>>,
  Path(user): Path<String>,
) -> Result<Json<LongestStreaks>, ApiError>
where
  S: HabitStore,
{
  let user = UserName::parse(Some(user.as_str()))?;
  let tracked = state
    .store
    .tracked_habits(&user)
    .await
    .map_err(ApiError::classify)?;

  let habits: Vec<HabitLongest> = tracked
    .into_iter()
    .map(|t| HabitLongest {
      habit_name:     t.habit_name,
      periodicity:    t.periodicity,
      longest_streak: t.subscription.streaks.longest,
    })
    .collect();
  let longest_streak = habits.iter().map(|h| h.longest_streak).max().unwrap_or(0);

  Ok(Json(LongestStreaks { user, longest_streak, habits }))
}

#[derive(Debug, Serialize)]
pub struct SingleLongest {
  pub user:           UserName,
  pub habit_name:     String,
  pub longest_streak: u32,
}

/// `GET /analytics/user/:user/longest-streak/:name`
pub async fn longest_streak<S>(
  State(state): State<ApiState<S>>,
  Path((user, name)): Path<(String, String)>,
) -> Result<Json<SingleLongest>, ApiError>
where
  S: HabitStore,
{
  let user = UserName::parse(Some(user.as_str()))?;
  let streaks = state
    .store
    .get_streaks(&user, &name)
    .await
    .map_err(ApiError::classify)?;
  Ok(Json(SingleLongest { user, habit_name: name, longest_streak: streaks.longest }))
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Timestamps {
  pub user:       UserName,
  pub habit_name: String,
  pub timestamps: Vec<NaiveDate>,
}

/// `GET /analytics/user/:user/tracked-timestamps/:name`
pub async fn timestamps<S>(
  State(state): State<ApiState<S>>,
  Path((user, name)): Path<(String, String)>,
) -> Result<Json<Timestamps>, ApiError>
where
  S: HabitStore,
{
  let user = UserName::parse(Some(user.as_str()))?;
  let timestamps = state
    .store
    .completions(&user, &name)
    .await
    .map_err(ApiError::classify)?
    .into_iter()
    .map(|c| c.completed_at)
    .collect();
  Ok(Json(Timestamps { user, habit_name: name, timestamps }))
}
