//! SQL schema for the Habitly SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habits (
    habit_id          TEXT PRIMARY KEY,
    owner_id          TEXT NOT NULL,   -- account_id supplied by the identity layer
    name              TEXT NOT NULL,
    description       TEXT,
    color             TEXT NOT NULL,   -- '#rrggbb'
    frequency         TEXT NOT NULL,   -- 'daily' | 'weekly' | 'custom'
    frequency_data    TEXT NOT NULL,   -- JSON, tagged by $.type
    last_completed_at TEXT,            -- RFC 3339 UTC, NULL until first completion
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    UNIQUE (owner_id, name)
);

CREATE INDEX IF NOT EXISTS habits_owner_page_idx
    ON habits(owner_id, created_at DESC, habit_id DESC);

PRAGMA user_version = 1;
";
