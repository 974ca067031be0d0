//! `SQLite` schema for the session store.

/// SQL statement to create the sessions table.
///
/// Timestamps are stored as `YYYY-MM-DD HH:MM` text, which sorts in
/// chronological order.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    volunteer_id TEXT NOT NULL,
    start_at TEXT NOT NULL,
    end_at TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (volunteer_id, start_at)
)
";

/// SQL statement to create an index for per-volunteer lookups.
///
/// Added by schema version 2.
pub const CREATE_VOLUNTEER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_sessions_volunteer ON sessions(volunteer_id, start_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Base schema statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SESSIONS_TABLE, CREATE_METADATA_TABLE];
