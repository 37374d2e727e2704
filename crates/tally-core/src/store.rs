//! The `HabitStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, `tally-server`) depend on this abstraction, not
//! on any concrete backend. A store is an explicitly constructed value handed
//! to its collaborators; there is no process-wide instance.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Classify,
  habit::{Habit, NewHabit, Periodicity},
  streak::Streaks,
  subscription::{CheckOff, Completion, Subscription, TrackedHabit},
  user::UserName,
};

/// Abstraction over a Tally store backend.
///
/// Habits are immutable once created. Subscriptions carry the streak counters
/// and own an append-only log of completions.
///
/// Failures are reported through `Self::Error`, which every backend can
/// classify into the shared [`ErrorKind`](crate::ErrorKind) taxonomy. Domain
/// outcomes such as "already tracking" arrive as errors of the matching kind.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Create and persist a new habit.
  ///
  /// Fails with a conflict if a habit with the same name exists; nothing is
  /// written in that case.
  fn create_habit(
    &self,
    input: NewHabit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// Retrieve a habit by name. Returns `None` if not found.
  fn get_habit<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + 'a;

  /// List all habits, optionally restricted to one periodicity.
  fn list_habits(
    &self,
    periodicity: Option<Periodicity>,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Start tracking `habit` for `user`, with both streaks at zero.
  fn start_tracking<'a>(
    &'a self,
    user: &'a UserName,
    habit: &'a str,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + 'a;

  /// Stop tracking `habit` for `user`. The subscription's completion history
  /// is deleted with it. Returns the removed subscription.
  fn stop_tracking<'a>(
    &'a self,
    user: &'a UserName,
    habit: &'a str,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + 'a;

  // ── Check-offs ────────────────────────────────────────────────────────

  /// Record a completion dated `today` and update the streak counters.
  ///
  /// Reading the last completion, deciding, appending the event, and writing
  /// the counters happen atomically. A second check-off on the same date is
  /// rejected without side effects.
  fn check_off<'a>(
    &'a self,
    user: &'a UserName,
    habit: &'a str,
    today: NaiveDate,
  ) -> impl Future<Output = Result<CheckOff, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Current and longest streak for `user` on `habit`.
  fn get_streaks<'a>(
    &'a self,
    user: &'a UserName,
    habit: &'a str,
  ) -> impl Future<Output = Result<Streaks, Self::Error>> + Send + 'a;

  /// Every habit `user` is tracking, with counters. Empty if none.
  fn tracked_habits<'a>(
    &'a self,
    user: &'a UserName,
  ) -> impl Future<Output = Result<Vec<TrackedHabit>, Self::Error>> + Send + 'a;

  /// Completion history for `user` on `habit`, most recent first.
  fn completions<'a>(
    &'a self,
    user: &'a UserName,
    habit: &'a str,
  ) -> impl Future<Output = Result<Vec<Completion>, Self::Error>> + Send + 'a;
}
