//! SQL schema for the Sylla SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS syllabi (
    course_code  TEXT PRIMARY KEY,   -- normalized (uppercase, no whitespace)
    title        TEXT NOT NULL,
    semester     TEXT NOT NULL,
    content_json TEXT NOT NULL DEFAULT '{}'
);

-- The commit log. Append order is the load order; `seq` preserves it across
-- the wholesale saves the store contract uses.
CREATE TABLE IF NOT EXISTS commits (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    commit_id     TEXT NOT NULL UNIQUE,
    author_id     TEXT NOT NULL,
    author_name   TEXT NOT NULL,
    recorded_at   TEXT NOT NULL,     -- ISO 8601 UTC
    message       TEXT NOT NULL,
    diff          TEXT NOT NULL,
    snapshot_json TEXT NOT NULL      -- full SyllabusRecord as of this commit
);

CREATE TABLE IF NOT EXISTS subscriptions (
    observer_id TEXT NOT NULL,
    pattern     TEXT NOT NULL        -- full code or department prefix
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    role_json     TEXT NOT NULL
);

-- Append-only; never rewritten by the save methods.
CREATE TABLE IF NOT EXISTS audit_log (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at TEXT NOT NULL,
    entry       TEXT NOT NULL
);

PRAGMA user_version = 1;
";
