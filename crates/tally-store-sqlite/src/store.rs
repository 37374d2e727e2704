//! [`SqliteStore`], the SQLite implementation of [`HabitStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tally_core::{
  Error as DomainError,
  habit::{Habit, NewHabit, Periodicity},
  store::HabitStore,
  streak::{Streaks, evaluate_checkoff},
  subscription::{CheckOff, Completion, Subscription, TrackedHabit},
  user::UserName,
};

use crate::{
  Result,
  encode::{
    HABIT_COLUMNS, RawCompletion, RawHabit, RawSubscription, RawTrackedHabit,
    SUBSCRIPTION_COLUMNS, decode_date, encode_date, encode_dt,
    encode_periodicity, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, so calls are serialised; each mutating call
/// additionally runs inside its own `IMMEDIATE` transaction.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = crate::Error;

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn create_habit(&self, input: NewHabit) -> Result<Habit> {
    let input = input.validate()?;
    let habit = Habit {
      habit_id:    Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      periodicity: input.periodicity,
      created_at:  Utc::now(),
    };

    let row = habit.clone();
    self.conn.call(move |conn| Ok(insert_habit(conn, &row))).await??;

    tracing::info!(habit = %habit.name, periodicity = %habit.periodicity, "habit created");
    Ok(habit)
  }

  async fn get_habit(&self, name: &str) -> Result<Option<Habit>> {
    let name = name.to_owned();
    self.conn.call(move |conn| Ok(find_habit(conn, &name))).await?
  }

  async fn list_habits(&self, periodicity: Option<Periodicity>) -> Result<Vec<Habit>> {
    let periodicity_str = periodicity.map(encode_periodicity);

    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HABIT_COLUMNS} FROM habits
           WHERE ?1 IS NULL OR periodicity = ?1
           ORDER BY name"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![periodicity_str], RawHabit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn start_tracking(&self, user: &UserName, habit: &str) -> Result<Subscription> {
    let (u, h) = (user.clone(), habit.to_owned());
    let subscription = self
      .conn
      .call(move |conn| Ok(insert_subscription(conn, &u, &h)))
      .await??;

    tracing::info!(user = %user, habit, "started tracking");
    Ok(subscription)
  }

  async fn stop_tracking(&self, user: &UserName, habit: &str) -> Result<Subscription> {
    let (u, h) = (user.clone(), habit.to_owned());
    let subscription = self
      .conn
      .call(move |conn| Ok(delete_subscription(conn, &u, &h)))
      .await??;

    tracing::info!(user = %user, habit, "stopped tracking");
    Ok(subscription)
  }

  // ── Check-offs ────────────────────────────────────────────────────────────

  async fn check_off(
    &self,
    user:  &UserName,
    habit: &str,
    today: NaiveDate,
  ) -> Result<CheckOff> {
    let (u, h) = (user.clone(), habit.to_owned());
    let check_off = self
      .conn
      .call(move |conn| Ok(check_off_tx(conn, &u, &h, today)))
      .await??;

    tracing::info!(
      user = %user,
      habit,
      %today,
      decision = ?check_off.decision,
      current = check_off.streaks.current,
      longest = check_off.streaks.longest,
      "habit checked off"
    );
    Ok(check_off)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_streaks(&self, user: &UserName, habit: &str) -> Result<Streaks> {
    let (u, h) = (user.clone(), habit.to_owned());
    self
      .conn
      .call(move |conn| {
        Ok(
          require_habit(conn, &h)
            .and_then(|habit| require_subscription(conn, &habit, &u))
            .map(|subscription| subscription.streaks),
        )
      })
      .await?
  }

  async fn tracked_habits(&self, user: &UserName) -> Result<Vec<TrackedHabit>> {
    let user_str = user.as_str().to_owned();

    let raws: Vec<RawTrackedHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             h.name, h.periodicity,
             s.subscription_id, s.habit_id, s.user_name,
             s.current_streak, s.longest_streak, s.created_at
           FROM subscriptions s
           JOIN habits h ON h.habit_id = s.habit_id
           WHERE s.user_name = ?1
           ORDER BY h.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok(RawTrackedHabit {
              habit_name:   row.get(0)?,
              periodicity:  row.get(1)?,
              subscription: RawSubscription::from_row_at(row, 2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTrackedHabit::into_tracked).collect()
  }

  async fn completions(&self, user: &UserName, habit: &str) -> Result<Vec<Completion>> {
    let (u, h) = (user.clone(), habit.to_owned());
    self
      .conn
      .call(move |conn| {
        Ok(
          require_habit(conn, &h)
            .and_then(|habit| require_subscription(conn, &habit, &u))
            .and_then(|subscription| list_completions(conn, subscription.subscription_id)),
        )
      })
      .await?
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────
//
// These run inside `tokio_rusqlite::Connection::call`. Domain failures are
// returned as `crate::Error` values; the caller unwraps the outer
// `tokio_rusqlite` result first and the domain result second.

fn find_habit(conn: &Connection, name: &str) -> Result<Option<Habit>> {
  conn
    .query_row(
      &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE name = ?1"),
      rusqlite::params![name],
      RawHabit::from_row,
    )
    .optional()?
    .map(RawHabit::into_habit)
    .transpose()
}

fn require_habit(conn: &Connection, name: &str) -> Result<Habit> {
  find_habit(conn, name)?
    .ok_or_else(|| DomainError::HabitNotFound(name.to_owned()).into())
}

fn find_subscription(
  conn:     &Connection,
  habit_id: Uuid,
  user:     &UserName,
) -> Result<Option<Subscription>> {
  conn
    .query_row(
      &format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
         WHERE habit_id = ?1 AND user_name = ?2"
      ),
      rusqlite::params![encode_uuid(habit_id), user.as_str()],
      |row| RawSubscription::from_row_at(row, 0),
    )
    .optional()?
    .map(RawSubscription::into_subscription)
    .transpose()
}

fn require_subscription(
  conn:  &Connection,
  habit: &Habit,
  user:  &UserName,
) -> Result<Subscription> {
  find_subscription(conn, habit.habit_id, user)?.ok_or_else(|| {
    DomainError::NotTracking {
      user:  user.to_string(),
      habit: habit.name.clone(),
    }
    .into()
  })
}

fn last_completed(conn: &Connection, subscription_id: Uuid) -> Result<Option<NaiveDate>> {
  conn
    .query_row(
      "SELECT completed_at FROM completions
       WHERE subscription_id = ?1
       ORDER BY completed_at DESC
       LIMIT 1",
      rusqlite::params![encode_uuid(subscription_id)],
      |row| row.get::<_, String>(0),
    )
    .optional()?
    .as_deref()
    .map(decode_date)
    .transpose()
}

fn completed_on(conn: &Connection, subscription_id: Uuid, date: NaiveDate) -> Result<bool> {
  let found = conn
    .query_row(
      "SELECT 1 FROM completions WHERE subscription_id = ?1 AND completed_at = ?2",
      rusqlite::params![encode_uuid(subscription_id), encode_date(date)],
      |_| Ok(()),
    )
    .optional()?;
  Ok(found.is_some())
}

fn list_completions(conn: &Connection, subscription_id: Uuid) -> Result<Vec<Completion>> {
  let mut stmt = conn.prepare(
    "SELECT completion_id, subscription_id, completed_at
     FROM completions
     WHERE subscription_id = ?1
     ORDER BY completed_at DESC",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(subscription_id)], |row| {
      Ok(RawCompletion {
        completion_id:   row.get(0)?,
        subscription_id: row.get(1)?,
        completed_at:    row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawCompletion::into_completion).collect()
}

fn insert_habit(conn: &mut Connection, habit: &Habit) -> Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  if find_habit(&tx, &habit.name)?.is_some() {
    return Err(DomainError::HabitAlreadyExists(habit.name.clone()).into());
  }

  tx.execute(
    "INSERT INTO habits (habit_id, name, description, periodicity, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(habit.habit_id),
      habit.name,
      habit.description,
      encode_periodicity(habit.periodicity),
      encode_dt(habit.created_at),
    ],
  )?;

  tx.commit()?;
  Ok(())
}

fn insert_subscription(
  conn:       &mut Connection,
  user:       &UserName,
  habit_name: &str,
) -> Result<Subscription> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let habit = require_habit(&tx, habit_name)?;

  if find_subscription(&tx, habit.habit_id, user)?.is_some() {
    return Err(
      DomainError::AlreadyTracking {
        user:  user.to_string(),
        habit: habit.name,
      }
      .into(),
    );
  }

  let subscription = Subscription {
    subscription_id: Uuid::new_v4(),
    habit_id:        habit.habit_id,
    user_name:       user.clone(),
    streaks:         Streaks::default(),
    created_at:      Utc::now(),
  };

  tx.execute(
    "INSERT INTO subscriptions
       (subscription_id, habit_id, user_name, current_streak, longest_streak, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(subscription.subscription_id),
      encode_uuid(subscription.habit_id),
      subscription.user_name.as_str(),
      subscription.streaks.current,
      subscription.streaks.longest,
      encode_dt(subscription.created_at),
    ],
  )?;

  tx.commit()?;
  Ok(subscription)
}

fn delete_subscription(
  conn:       &mut Connection,
  user:       &UserName,
  habit_name: &str,
) -> Result<Subscription> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let habit = require_habit(&tx, habit_name)?;
  let subscription = require_subscription(&tx, &habit, user)?;

  // Completions go with it via ON DELETE CASCADE.
  tx.execute(
    "DELETE FROM subscriptions WHERE subscription_id = ?1",
    rusqlite::params![encode_uuid(subscription.subscription_id)],
  )?;

  tx.commit()?;
  Ok(subscription)
}

/// Read the last completion, decide, append, and update the counters in one
/// transaction. Returning early drops `tx`, which rolls it back.
fn check_off_tx(
  conn:       &mut Connection,
  user:       &UserName,
  habit_name: &str,
  today:      NaiveDate,
) -> Result<CheckOff> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let habit = require_habit(&tx, habit_name)?;
  let subscription = require_subscription(&tx, &habit, user)?;

  // A later-dated completion hides an existing one for `today` from the
  // engine, so look for it directly as well.
  let last = last_completed(&tx, subscription.subscription_id)?;
  let decision = evaluate_checkoff(habit.periodicity, last, today);
  if !decision.is_accepted() || completed_on(&tx, subscription.subscription_id, today)? {
    return Err(
      DomainError::AlreadyCheckedOffToday {
        user:  user.to_string(),
        habit: habit.name,
      }
      .into(),
    );
  }

  let streaks = subscription.streaks.apply(decision);
  let completion = Completion {
    completion_id:   Uuid::new_v4(),
    subscription_id: subscription.subscription_id,
    completed_at:    today,
  };
  let subscription_id_str = encode_uuid(subscription.subscription_id);

  tx.execute(
    "INSERT INTO completions (completion_id, subscription_id, completed_at)
     VALUES (?1, ?2, ?3)",
    rusqlite::params![
      encode_uuid(completion.completion_id),
      subscription_id_str,
      encode_date(today),
    ],
  )?;

  tx.execute(
    "UPDATE subscriptions
     SET current_streak = ?1, longest_streak = ?2
     WHERE subscription_id = ?3",
    rusqlite::params![streaks.current, streaks.longest, subscription_id_str],
  )?;

  tx.commit()?;
  Ok(CheckOff { completion, decision, streaks })
}
