//! Handlers for tracking and checking off habits.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/habits/track/:name` | Body `{"username":"..."}`; 201, 409 if already tracking |
//! | `DELETE` | `/habits/untrack/:name` | Body `{"username":"..."}`; drops the completion history too |
//! | `POST`   | `/habits/check-off/:name` | Body `{"username":"..."}`; 409 on a second check-off the same day |
//! | `GET`    | `/habits/user/:user/streaks/:name` | Current and longest streak |
//!
//! A missing or blank `username` is a 400 before the store is touched.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{
  store::HabitStore,
  streak::{Decision, Streaks},
  subscription::Subscription,
  user::UserName,
};

use crate::{ApiState, error::ApiError};

/// JSON body carrying the acting user's identity.
#[derive(Debug, Default, Deserialize)]
pub struct UserBody {
  pub username: Option<String>,
}

impl UserBody {
  fn user(&self) -> Result<UserName, ApiError> {
    Ok(UserName::parse(self.username.as_deref())?)
  }
}

fn user_from(body: Result<Json<UserBody>, JsonRejection>) -> Result<UserName, ApiError> {
  let Json(body) = body?;
  body.user()
}

#[derive(Debug, Serialize)]
pub struct Message {
  pub message: &'static str,
}

// ─── Track / untrack ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TrackResponse {
  pub message:      &'static str,
  pub subscription: Subscription,
}

/// `POST /habits/track/:name`
pub async fn track<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  body: Result<Json<UserBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HabitStore,
{
  let user = user_from(body)?;
  let subscription = state
    .store
    .start_tracking(&user, &name)
    .await
    .map_err(ApiError::classify)?;
  Ok((
    StatusCode::CREATED,
    Json(TrackResponse { message: "Started tracking habit", subscription }),
  ))
}

/// `DELETE /habits/untrack/:name`
pub async fn untrack<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  body: Result<Json<UserBody>, JsonRejection>,
) -> Result<Json<Message>, ApiError>
where
  S: HabitStore,
{
  let user = user_from(body)?;
  state
    .store
    .stop_tracking(&user, &name)
    .await
    .map_err(ApiError::classify)?;
  Ok(Json(Message { message: "Habit untracked" }))
}

// ─── Check-off ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CheckOffResponse {
  pub message:      &'static str,
  pub habit_name:   String,
  pub user_name:    UserName,
  pub completed_at: NaiveDate,
  pub decision:     Decision,
  #[serde(flatten)]
  pub streaks:      Streaks,
}

/// `POST /habits/check-off/:name`, dated by the state's clock.
pub async fn check_off<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  body: Result<Json<UserBody>, JsonRejection>,
) -> Result<Json<CheckOffResponse>, ApiError>
where
  S: HabitStore,
{
  let user = user_from(body)?;
  let today = state.clock.today();
  let check_off = state
    .store
    .check_off(&user, &name, today)
    .await
    .map_err(ApiError::classify)?;

  Ok(Json(CheckOffResponse {
    message:      "Habit checked off",
    habit_name:   name,
    user_name:    user,
    completed_at: check_off.completion.completed_at,
    decision:     check_off.decision,
    streaks:      check_off.streaks,
  }))
}

// ─── Streaks ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StreaksResponse {
  pub habit_name: String,
  pub user_name:  UserName,
  #[serde(flatten)]
  pub streaks:    Streaks,
}

/// `GET /habits/user/:user/streaks/:name`
pub async fn streaks<S>(
  State(state): State<ApiState<S>>,
  Path((user, name)): Path<(String, String)>,
) -> Result<Json<StreaksResponse>, ApiError>
where
  S: HabitStore,
{
  let user = UserName::parse(Some(user.as_str()))?;
  let streaks = state
    .store
    .get_streaks(&user, &name)
    .await
    .map_err(ApiError::classify)?;
  Ok(Json(StreaksResponse { habit_name: name, user_name: user, streaks }))
}
