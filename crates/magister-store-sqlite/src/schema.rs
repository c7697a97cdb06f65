//! SQL schema for the Magister SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    login         TEXT    NOT NULL UNIQUE,
    email         TEXT    NOT NULL,
    password      TEXT    NOT NULL,   -- 64 hex chars
    password_salt TEXT    NOT NULL,   -- 64 hex chars
    is_active     INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT    NOT NULL,   -- RFC 3339 UTC
    updated_at    TEXT    NOT NULL
);

-- `id` is the subject (user) id, not a row id; a user may hold many keys.
CREATE TABLE IF NOT EXISTS sessions (
    id     INTEGER NOT NULL REFERENCES users(id),
    "key"  TEXT    NOT NULL UNIQUE,
    issued TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS users_email_idx      ON users(email);
CREATE INDEX IF NOT EXISTS sessions_subject_idx ON sessions(id);

PRAGMA user_version = 1;
"#;
