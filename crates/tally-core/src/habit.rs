//! Habits: the catalogue of things a user can track.
//!
//! A habit is created once and never updated. Users opt into tracking it
//! through a [`Subscription`](crate::subscription::Subscription).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// How often a habit must be checked off to keep its streak alive.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Periodicity {
  Daily,
  Weekly,
}

impl Periodicity {
  /// Parse the wire/database form (`DAILY` / `WEEKLY`, case-insensitive).
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownPeriodicity(s.to_owned()))
  }
}

/// A persisted habit. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id:    Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub periodicity: Periodicity,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::HabitStore::create_habit`].
/// `habit_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHabit {
  pub name:        String,
  pub description: Option<String>,
  pub periodicity: Periodicity,
}

impl NewHabit {
  pub fn new(name: impl Into<String>, periodicity: Periodicity) -> Self {
    Self { name: name.into(), description: None, periodicity }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// Trim the name and reject it if nothing is left.
  pub fn validate(mut self) -> Result<Self> {
    let trimmed = self.name.trim();
    if trimmed.is_empty() {
      return Err(Error::EmptyHabitName);
    }
    if trimmed.len() != self.name.len() {
      self.name = trimmed.to_owned();
    }
    Ok(self)
  }
}
