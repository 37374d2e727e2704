//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Days, NaiveDate};
use tally_core::{
  Classify, Error as DomainError, ErrorKind,
  habit::{NewHabit, Periodicity},
  store::HabitStore,
  streak::{Decision, Streaks},
  user::UserName,
};

use crate::{Error, SqliteStore, seed};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn user(name: &str) -> UserName { UserName::parse(Some(name)).unwrap() }

fn day(n: u64) -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 3, 1)
    .unwrap()
    .checked_add_days(Days::new(n))
    .unwrap()
}

async fn tracked(s: &SqliteStore, who: &str, habit: &str, periodicity: Periodicity) {
  s.create_habit(NewHabit::new(habit, periodicity)).await.unwrap();
  s.start_tracking(&user(who), habit).await.unwrap();
}

async fn completion_rows(s: &SqliteStore) -> i64 {
  s.conn
    .call(|c| Ok(c.query_row("SELECT COUNT(*) FROM completions", [], |r| r.get(0))?))
    .await
    .unwrap()
}

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_habit() {
  let s = store().await;

  let habit = s
    .create_habit(NewHabit::new("Read", Periodicity::Daily).with_description("Read a book"))
    .await
    .unwrap();
  assert_eq!(habit.name, "Read");

  let fetched = s.get_habit("Read").await.unwrap().unwrap();
  assert_eq!(fetched, habit);
  assert_eq!(fetched.description.as_deref(), Some("Read a book"));
}

#[tokio::test]
async fn get_habit_missing_returns_none() {
  let s = store().await;
  assert!(s.get_habit("Nope").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_habit_name_conflicts_and_inserts_nothing() {
  let s = store().await;
  s.create_habit(NewHabit::new("Exercise", Periodicity::Daily)).await.unwrap();

  let err = s
    .create_habit(NewHabit::new("Exercise", Periodicity::Weekly))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert!(matches!(err, Error::Core(DomainError::HabitAlreadyExists(ref n)) if n == "Exercise"));

  let all = s.list_habits(None).await.unwrap();
  assert_eq!(all.iter().filter(|h| h.name == "Exercise").count(), 1);
  assert_eq!(all[0].periodicity, Periodicity::Daily);
}

#[tokio::test]
async fn blank_habit_name_is_a_validation_error() {
  let s = store().await;
  let err = s
    .create_habit(NewHabit::new("  ", Periodicity::Daily))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(s.list_habits(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_habits_filtered_by_periodicity() {
  let s = store().await;
  s.create_habit(NewHabit::new("Read", Periodicity::Daily)).await.unwrap();
  s.create_habit(NewHabit::new("Call Family", Periodicity::Weekly)).await.unwrap();
  s.create_habit(NewHabit::new("Exercise", Periodicity::Daily)).await.unwrap();

  let all = s.list_habits(None).await.unwrap();
  assert_eq!(all.len(), 3);

  let daily = s.list_habits(Some(Periodicity::Daily)).await.unwrap();
  let names: Vec<_> = daily.iter().map(|h| h.name.as_str()).collect();
  assert_eq!(names, ["Exercise", "Read"]);

  let weekly = s.list_habits(Some(Periodicity::Weekly)).await.unwrap();
  assert_eq!(weekly.len(), 1);
}

// ─── Tracking ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_tracking_starts_at_zero() {
  let s = store().await;
  s.create_habit(NewHabit::new("Read", Periodicity::Daily)).await.unwrap();

  let sub = s.start_tracking(&user("Alice"), "Read").await.unwrap();
  assert_eq!(sub.streaks, Streaks::default());
  assert_eq!(sub.user_name.as_str(), "Alice");

  let streaks = s.get_streaks(&user("Alice"), "Read").await.unwrap();
  assert_eq!(streaks, Streaks::default());
}

#[tokio::test]
async fn start_tracking_twice_conflicts() {
  let s = store().await;
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  let err = s.start_tracking(&user("Alice"), "Read").await.unwrap_err();
  assert!(matches!(err, Error::Core(DomainError::AlreadyTracking { .. })));
  assert_eq!(s.tracked_habits(&user("Alice")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn start_tracking_unknown_habit_is_not_found() {
  let s = store().await;
  let err = s.start_tracking(&user("Alice"), "Nope").await.unwrap_err();
  assert!(matches!(err, Error::Core(DomainError::HabitNotFound(_))));
}

#[tokio::test]
async fn stop_tracking_without_subscription_is_not_tracking() {
  let s = store().await;
  s.create_habit(NewHabit::new("Read", Periodicity::Daily)).await.unwrap();

  let err = s.stop_tracking(&user("Alice"), "Read").await.unwrap_err();
  assert!(matches!(err, Error::Core(DomainError::NotTracking { .. })));

  let err = s.stop_tracking(&user("Alice"), "Nope").await.unwrap_err();
  assert!(matches!(err, Error::Core(DomainError::HabitNotFound(_))));
}

#[tokio::test]
async fn stop_tracking_cascades_to_completions() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;
  s.check_off(&alice, "Read", day(0)).await.unwrap();
  s.check_off(&alice, "Read", day(1)).await.unwrap();
  assert_eq!(completion_rows(&s).await, 2);

  s.stop_tracking(&alice, "Read").await.unwrap();
  assert_eq!(completion_rows(&s).await, 0);
  assert!(s.tracked_habits(&alice).await.unwrap().is_empty());

  // Tracking again starts over.
  s.start_tracking(&alice, "Read").await.unwrap();
  assert_eq!(s.get_streaks(&alice, "Read").await.unwrap(), Streaks::default());
  assert!(s.completions(&alice, "Read").await.unwrap().is_empty());
}

// ─── Check-offs ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_scenario_extends_resets_and_keeps_longest() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  let c = s.check_off(&alice, "Read", day(1)).await.unwrap();
  assert_eq!(c.decision, Decision::Extend);
  assert_eq!(c.streaks, Streaks { current: 1, longest: 1 });

  let c = s.check_off(&alice, "Read", day(2)).await.unwrap();
  assert_eq!(c.streaks, Streaks { current: 2, longest: 2 });

  let c = s.check_off(&alice, "Read", day(4)).await.unwrap();
  assert_eq!(c.decision, Decision::Reset);
  assert_eq!(c.streaks, Streaks { current: 1, longest: 2 });

  assert_eq!(
    s.get_streaks(&alice, "Read").await.unwrap(),
    Streaks { current: 1, longest: 2 }
  );
}

#[tokio::test]
async fn same_day_check_off_is_rejected_without_side_effects() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  s.check_off(&alice, "Read", day(0)).await.unwrap();
  let before = s.get_streaks(&alice, "Read").await.unwrap();

  for _ in 0..3 {
    let err = s.check_off(&alice, "Read", day(0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(err, Error::Core(DomainError::AlreadyCheckedOffToday { .. })));
  }

  assert_eq!(s.get_streaks(&alice, "Read").await.unwrap(), before);
  assert_eq!(completion_rows(&s).await, 1);
}

#[tokio::test]
async fn check_off_when_not_tracking_writes_nothing() {
  let s = store().await;
  s.create_habit(NewHabit::new("Read", Periodicity::Daily)).await.unwrap();

  let err = s.check_off(&user("Bob"), "Read", day(0)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(matches!(err, Error::Core(DomainError::NotTracking { .. })));
  assert_eq!(completion_rows(&s).await, 0);
}

#[tokio::test]
async fn check_off_unknown_habit_is_not_found() {
  let s = store().await;
  let err = s.check_off(&user("Bob"), "Nope", day(0)).await.unwrap_err();
  assert!(matches!(err, Error::Core(DomainError::HabitNotFound(_))));
}

#[tokio::test]
async fn weekly_habit_extends_at_seven_days_and_resets_at_eight() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Call Family", Periodicity::Weekly).await;

  s.check_off(&alice, "Call Family", day(0)).await.unwrap();
  let c = s.check_off(&alice, "Call Family", day(7)).await.unwrap();
  assert_eq!(c.decision, Decision::Extend);
  assert_eq!(c.streaks.current, 2);

  let c = s.check_off(&alice, "Call Family", day(15)).await.unwrap();
  assert_eq!(c.decision, Decision::Reset);
  assert_eq!(c.streaks, Streaks { current: 1, longest: 2 });
}

#[tokio::test]
async fn streaks_are_per_user() {
  let s = store().await;
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;
  s.start_tracking(&user("Bob"), "Read").await.unwrap();

  s.check_off(&user("Alice"), "Read", day(0)).await.unwrap();
  s.check_off(&user("Alice"), "Read", day(1)).await.unwrap();
  s.check_off(&user("Bob"), "Read", day(1)).await.unwrap();

  assert_eq!(s.get_streaks(&user("Alice"), "Read").await.unwrap().current, 2);
  assert_eq!(s.get_streaks(&user("Bob"), "Read").await.unwrap().current, 1);
}

#[tokio::test]
async fn concurrent_same_day_check_offs_record_once() {
  let s = store().await;
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  let mut handles = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      s.check_off(&user("Alice"), "Read", day(0)).await
    }));
  }

  let mut accepted = 0;
  for h in handles {
    if h.await.unwrap().is_ok() {
      accepted += 1;
    }
  }
  assert_eq!(accepted, 1);
  assert_eq!(completion_rows(&s).await, 1);
  assert_eq!(
    s.get_streaks(&user("Alice"), "Read").await.unwrap(),
    Streaks { current: 1, longest: 1 }
  );
}

#[tokio::test]
async fn invariant_holds_after_every_check_off() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  let mut today = day(0);
  for (i, gap) in [0, 1, 1, 2, 1, 1, 1, 5, 1, 0].into_iter().enumerate() {
    today = today.checked_add_days(Days::new(gap)).unwrap();
    let result = s.check_off(&alice, "Read", today).await;
    if i > 0 && gap == 0 {
      let err = result.unwrap_err();
      assert!(
        matches!(err, Error::Core(DomainError::AlreadyCheckedOffToday { .. })),
        "{err:?}"
      );
    } else {
      result.unwrap();
    }
    let st = s.get_streaks(&alice, "Read").await.unwrap();
    assert!(st.current <= st.longest, "{st:?}");
  }
}

#[tokio::test]
async fn earlier_recorded_date_is_rejected_behind_a_later_completion() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  s.check_off(&alice, "Read", day(5)).await.unwrap();
  let c = s.check_off(&alice, "Read", day(4)).await.unwrap();
  assert_eq!(c.decision, Decision::Reset);
  let before = s.get_streaks(&alice, "Read").await.unwrap();

  let err = s.check_off(&alice, "Read", day(4)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert!(matches!(err, Error::Core(DomainError::AlreadyCheckedOffToday { .. })));

  assert_eq!(s.get_streaks(&alice, "Read").await.unwrap(), before);
  assert_eq!(completion_rows(&s).await, 2);
}

#[tokio::test]
async fn corrupted_counters_surface_as_invariant_violation() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  s.conn
    .call(|c| {
      c.execute("UPDATE subscriptions SET current_streak = 5, longest_streak = 2", [])?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.get_streaks(&alice, "Read").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvariantViolation);

  let err = s.check_off(&alice, "Read", day(0)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvariantViolation);
  assert_eq!(completion_rows(&s).await, 0);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn completions_are_newest_first() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;

  for n in [0, 1, 3] {
    s.check_off(&alice, "Read", day(n)).await.unwrap();
  }

  let dates: Vec<_> = s
    .completions(&alice, "Read")
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.completed_at)
    .collect();
  assert_eq!(dates, [day(3), day(1), day(0)]);
}

#[tokio::test]
async fn tracked_habits_join_habit_details() {
  let s = store().await;
  let alice = user("Alice");
  tracked(&s, "Alice", "Read", Periodicity::Daily).await;
  tracked(&s, "Alice", "Call Family", Periodicity::Weekly).await;
  s.check_off(&alice, "Read", day(0)).await.unwrap();

  let habits = s.tracked_habits(&alice).await.unwrap();
  assert_eq!(habits.len(), 2);
  assert_eq!(habits[0].habit_name, "Call Family");
  assert_eq!(habits[0].periodicity, Periodicity::Weekly);
  assert_eq!(habits[1].habit_name, "Read");
  assert_eq!(habits[1].subscription.streaks.current, 1);

  assert!(s.tracked_habits(&user("Nobody")).await.unwrap().is_empty());
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeding_is_idempotent() {
  let s = store().await;
  s.create_habit(NewHabit::new("Read", Periodicity::Daily)).await.unwrap();

  let created = seed::seed_defaults(&s).await.unwrap();
  assert_eq!(created.len(), seed::DEFAULT_HABITS.len() - 1);

  let again = seed::seed_defaults(&s).await.unwrap();
  assert!(again.is_empty());
  assert_eq!(s.list_habits(None).await.unwrap().len(), seed::DEFAULT_HABITS.len());
}

#[tokio::test]
async fn reopening_a_file_store_keeps_data() {
  let path = std::env::temp_dir().join(format!("tally-{}.db", uuid::Uuid::new_v4()));
  {
    let s = SqliteStore::open(&path).await.unwrap();
    tracked(&s, "Alice", "Read", Periodicity::Daily).await;
    s.check_off(&user("Alice"), "Read", day(0)).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(
    s.get_streaks(&user("Alice"), "Read").await.unwrap(),
    Streaks { current: 1, longest: 1 }
  );

  drop(s);
  let _ = std::fs::remove_file(&path);
}
