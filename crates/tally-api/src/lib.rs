//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::HabitStore`].
//! The date used for check-offs comes from the [`Clock`] in [`ApiState`], so
//! tests can pin it. Auth and TLS are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = tally_api::app(ApiState::new(store, Arc::new(SystemClock)));
//! ```

pub mod analytics;
pub mod error;
pub mod habits;
pub mod tracking;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, post},
};
use serde_json::{Value, json};
use tally_core::{clock::Clock, store::HabitStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub clock: Arc<dyn Clock>,
}

impl<S> ApiState<S> {
  pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
    Self { store: Arc::new(store), clock }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), clock: Arc::clone(&self.clock) }
  }
}

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Build the `/api` routes for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: HabitStore + 'static,
{
  Router::new()
    // Habits
    .route("/habits", get(habits::list::<S>))
    .route("/habits/create", post(habits::create::<S>))
    .route("/habits/periodicity/{periodicity}", get(habits::by_periodicity::<S>))
    .route("/habits/{name}", get(habits::get_one::<S>))
    // Tracking
    .route("/habits/track/{name}", post(tracking::track::<S>))
    .route("/habits/untrack/{name}", delete(tracking::untrack::<S>))
    .route("/habits/check-off/{name}", post(tracking::check_off::<S>))
    .route("/habits/user/{user}/streaks/{name}", get(tracking::streaks::<S>))
    // Analytics
    .route("/analytics/habits/tracking/{user}", get(analytics::tracked::<S>))
    .route("/analytics/user/{user}/longest-streak", get(analytics::longest_streaks::<S>))
    .route(
      "/analytics/user/{user}/longest-streak/{name}",
      get(analytics::longest_streak::<S>),
    )
    .route(
      "/analytics/user/{user}/tracked-timestamps/{name}",
      get(analytics::timestamps::<S>),
    )
    .with_state(state)
}

/// The full application: a welcome banner at `/`, the API under `/api`, and
/// request tracing.
pub fn app<S>(state: ApiState<S>) -> Router<()>
where
  S: HabitStore + 'static,
{
  Router::new()
    .route("/", get(welcome))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// `GET /`
pub async fn welcome() -> Json<Value> {
  Json(json!({
    "name":    env!("CARGO_PKG_NAME"),
    "version": env!("CARGO_PKG_VERSION"),
    "message": "Welcome to Tally",
  }))
}
