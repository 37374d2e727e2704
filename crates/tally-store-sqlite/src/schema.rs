//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Habits are created once and never updated.
CREATE TABLE IF NOT EXISTS habits (
    habit_id     TEXT PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    periodicity  TEXT NOT NULL CHECK (periodicity IN ('DAILY', 'WEEKLY')),
    created_at   TEXT NOT NULL
);

-- One row per user tracking a habit; carries the streak counters.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    habit_id        TEXT NOT NULL REFERENCES habits(habit_id),
    user_name       TEXT NOT NULL,
    current_streak  INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
    longest_streak  INTEGER NOT NULL DEFAULT 0 CHECK (longest_streak >= 0),
    created_at      TEXT NOT NULL,
    UNIQUE (user_name, habit_id)
);

-- Append-only check-off log. At most one row per subscription per day.
CREATE TABLE IF NOT EXISTS completions (
    completion_id   TEXT PRIMARY KEY,
    subscription_id TEXT NOT NULL
                    REFERENCES subscriptions(subscription_id) ON DELETE CASCADE,
    completed_at    TEXT NOT NULL,   -- YYYY-MM-DD
    UNIQUE (subscription_id, completed_at)
);

CREATE INDEX IF NOT EXISTS habits_periodicity_idx  ON habits(periodicity);
CREATE INDEX IF NOT EXISTS subscriptions_user_idx  ON subscriptions(user_name);

PRAGMA user_version = 1;
";
