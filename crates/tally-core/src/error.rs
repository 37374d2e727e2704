//! Error types for `tally-core`.
//!
//! Every failure a store operation can report falls into one of the
//! [`ErrorKind`] buckets. Request boundaries translate the kind into a
//! response; nothing here is meant to abort the process.

use thiserror::Error;

/// The coarse category of a failure, independent of which crate raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A required input was missing or malformed.
  Validation,
  /// The habit or subscription addressed by the request does not exist.
  NotFound,
  /// The request collides with existing state.
  Conflict,
  /// Stored state breaks a domain invariant (e.g. current > longest streak).
  InvariantViolation,
  /// The storage layer itself failed.
  Infrastructure,
}

/// Errors that can be sorted into an [`ErrorKind`].
///
/// Implemented by the domain [`Error`] and by every store backend's error
/// type, so callers can classify failures without knowing the backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user name must be provided")]
  MissingUser,

  #[error("habit name must not be empty")]
  EmptyHabitName,

  #[error("unknown periodicity: {0:?}")]
  UnknownPeriodicity(String),

  #[error("habit not found: {0}")]
  HabitNotFound(String),

  #[error("habit already exists: {0}")]
  HabitAlreadyExists(String),

  #[error("{user} is already tracking {habit}")]
  AlreadyTracking { user: String, habit: String },

  #[error("{user} is not tracking {habit}")]
  NotTracking { user: String, habit: String },

  #[error("{habit} already checked off today by {user}")]
  AlreadyCheckedOffToday { user: String, habit: String },

  #[error("invariant violation: {0}")]
  InvariantViolation(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::MissingUser | Self::EmptyHabitName | Self::UnknownPeriodicity(_) => {
        ErrorKind::Validation
      }
      Self::HabitNotFound(_) | Self::NotTracking { .. } => ErrorKind::NotFound,
      Self::HabitAlreadyExists(_)
      | Self::AlreadyTracking { .. }
      | Self::AlreadyCheckedOffToday { .. } => ErrorKind::Conflict,
      Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
