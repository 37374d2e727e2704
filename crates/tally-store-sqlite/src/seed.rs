//! Default habit catalogue for fresh databases.

use tally_core::{
  habit::{Habit, NewHabit, Periodicity},
  store::HabitStore,
};

/// `(name, description, periodicity)` for every default habit.
pub const DEFAULT_HABITS: &[(&str, &str, Periodicity)] = &[
  ("Read", "Read for at least 20 minutes", Periodicity::Daily),
  ("Exercise", "Any workout of 30 minutes or more", Periodicity::Daily),
  ("Meditate", "Ten minutes of quiet breathing", Periodicity::Daily),
  ("Review Finances", "Go over the week's spending", Periodicity::Weekly),
  ("Call Family", "Catch up with someone at home", Periodicity::Weekly),
];

/// Insert any [`DEFAULT_HABITS`] that are not in `store` yet and return the
/// ones that were created. Running it twice is harmless.
pub async fn seed_defaults<S: HabitStore>(store: &S) -> Result<Vec<Habit>, S::Error> {
  let mut created = Vec::new();
  for &(name, description, periodicity) in DEFAULT_HABITS {
    if store.get_habit(name).await?.is_some() {
      continue;
    }
    let habit = store
      .create_habit(NewHabit::new(name, periodicity).with_description(description))
      .await?;
    created.push(habit);
  }
  tracing::info!(created = created.len(), "seeded default habits");
  Ok(created)
}
