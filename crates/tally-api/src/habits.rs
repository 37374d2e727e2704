//! Handlers for the habit catalogue.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/habits` | All habits |
//! | `GET`  | `/habits/:name` | 404 if not found |
//! | `GET`  | `/habits/periodicity/:periodicity` | `DAILY` or `WEEKLY`; 400 otherwise |
//! | `POST` | `/habits/create` | Body: [`CreateBody`]; 201, or 409 if the name is taken |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tally_core::{
  habit::{Habit, NewHabit, Periodicity},
  store::HabitStore,
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct HabitList {
  pub habits: Vec<Habit>,
}

#[derive(Debug, Serialize)]
pub struct HabitEnvelope {
  pub habit: Habit,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /habits`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<HabitList>, ApiError>
where
  S: HabitStore,
{
  let habits = state.store.list_habits(None).await.map_err(ApiError::classify)?;
  Ok(Json(HabitList { habits }))
}

/// `GET /habits/periodicity/:periodicity`
pub async fn by_periodicity<S>(
  State(state): State<ApiState<S>>,
  Path(periodicity): Path<String>,
) -> Result<Json<HabitList>, ApiError>
where
  S: HabitStore,
{
  let periodicity = Periodicity::parse(&periodicity)?;
  let habits = state
    .store
    .list_habits(Some(periodicity))
    .await
    .map_err(ApiError::classify)?;
  Ok(Json(HabitList { habits }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /habits/:name`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<HabitEnvelope>, ApiError>
where
  S: HabitStore,
{
  let habit = state
    .store
    .get_habit(&name)
    .await
    .map_err(ApiError::classify)?
    .ok_or_else(|| ApiError::NotFound(format!("habit {name} not found")))?;
  Ok(Json(HabitEnvelope { habit }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /habits/create`. Every field is optional at the
/// parsing layer so a missing one becomes a 400 with a useful message.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub habit_name:  Option<String>,
  pub description: Option<String>,
  pub periodicity: Option<String>,
}

impl CreateBody {
  fn into_new_habit(self) -> Result<NewHabit, ApiError> {
    let name = self
      .habit_name
      .ok_or_else(|| ApiError::BadRequest("habit_name is required".into()))?;
    let periodicity = self
      .periodicity
      .ok_or_else(|| ApiError::BadRequest("periodicity is required".into()))?;

    Ok(NewHabit {
      name,
      description: self.description,
      periodicity: Periodicity::parse(&periodicity)?,
    })
  }
}

/// `POST /habits/create`. Returns 201 with the stored [`Habit`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HabitStore,
{
  let Json(body) = body?;
  let habit = state
    .store
    .create_habit(body.into_new_habit()?)
    .await
    .map_err(ApiError::classify)?;
  Ok((StatusCode::CREATED, Json(HabitEnvelope { habit })))
}
