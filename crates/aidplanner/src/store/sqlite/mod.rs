//! `SQLite`-backed session store.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::session::{format_storage, BookedInterval, STORAGE_FORMAT};

use super::SessionStore;

/// Sessions kept in a `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count every stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_interval(row: &rusqlite::Row) -> rusqlite::Result<BookedInterval> {
        let volunteer_id: String = row.get(0)?;
        let start = parse_column(row, 1)?;
        let end = parse_column(row, 2)?;
        BookedInterval::new(volunteer_id, start, end).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                e.to_string().into(),
            )
        })
    }
}

fn parse_column(row: &rusqlite::Row, index: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(index)?;
    NaiveDateTime::parse_from_str(&text, STORAGE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl SessionStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn sessions_for(&self, volunteer_id: &str) -> Result<Vec<BookedInterval>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT volunteer_id, start_at, end_at
            FROM sessions WHERE volunteer_id = ?1
            ORDER BY start_at ASC
            ",
        )?;

        let sessions = stmt
            .query_map([volunteer_id], Self::row_to_interval)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    fn append(&self, interval: &BookedInterval) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO sessions (volunteer_id, start_at, end_at)
            VALUES (?1, ?2, ?3)
            ",
            params![
                interval.volunteer_id,
                format_storage(interval.start),
                format_storage(interval.end),
            ],
        )?;

        info!(
            volunteer_id = %interval.volunteer_id,
            start = %format_storage(interval.start),
            end = %format_storage(interval.end),
            id = self.conn.last_insert_rowid(),
            "session appended"
        );
        Ok(())
    }

    fn remove(&self, volunteer_id: &str, start: NaiveDateTime) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE volunteer_id = ?1 AND start_at = ?2",
            params![volunteer_id, format_storage(start)],
        )?;

        if affected > 0 {
            info!(volunteer_id, start = %format_storage(start), "session removed");
        }
        Ok(affected > 0)
    }

    fn remove_all_for(&self, volunteer_id: &str) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE volunteer_id = ?1", [volunteer_id])?;

        if affected > 0 {
            info!(volunteer_id, removed = affected, "sessions purged");
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::parse_storage;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn booking(volunteer: &str, start: &str, end: &str) -> BookedInterval {
        BookedInterval::new(
            volunteer,
            parse_storage(start).unwrap(),
            parse_storage(end).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let store = create_test_store();
        assert_eq!(store.path(), Path::new(":memory:"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_append_and_fetch_sorted() {
        let store = create_test_store();
        store
            .append(&booking("vol1", "2024-03-12 09:00", "2024-03-12 10:00"))
            .unwrap();
        store
            .append(&booking("vol2", "2024-03-11 09:00", "2024-03-11 10:00"))
            .unwrap();
        store
            .append(&booking("vol1", "2024-03-10 09:00", "2024-03-10 11:00"))
            .unwrap();

        let sessions = store.sessions_for("vol1").unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0], booking("vol1", "2024-03-10 09:00", "2024-03-10 11:00"));
        assert_eq!(sessions[1], booking("vol1", "2024-03-12 09:00", "2024-03-12 10:00"));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_duplicate_start_is_refused() {
        let store = create_test_store();
        let session = booking("vol1", "2024-03-10 09:00", "2024-03-10 11:00");
        store.append(&session).unwrap();

        assert!(matches!(
            store.append(&session),
            Err(Error::DatabaseQuery(_))
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store
            .append(&booking("vol1", "2024-03-10 09:00", "2024-03-10 11:00"))
            .unwrap();

        let start = parse_storage("2024-03-10 09:00").unwrap();
        assert!(!store.remove("vol2", start).unwrap());
        assert!(store.remove("vol1", start).unwrap());
        assert!(!store.remove("vol1", start).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_remove_all_for() {
        let store = create_test_store();
        store
            .append(&booking("vol1", "2024-03-10 09:00", "2024-03-10 11:00"))
            .unwrap();
        store
            .append(&booking("vol1", "2024-03-11 09:00", "2024-03-11 11:00"))
            .unwrap();
        store
            .append(&booking("vol2", "2024-03-10 09:00", "2024-03-10 11:00"))
            .unwrap();

        assert_eq!(store.remove_all_for("vol1").unwrap(), 2);
        assert!(store.sessions_for("vol1").unwrap().is_empty());
        assert_eq!(store.sessions_for("vol2").unwrap().len(), 1);
    }

    #[test]
    fn test_bad_timestamp_column_is_an_error() {
        let store = create_test_store();
        store
            .conn
            .execute(
                "INSERT INTO sessions (volunteer_id, start_at, end_at) VALUES ('vol1', 'soon', 'later')",
                [],
            )
            .unwrap();

        assert!(store.sessions_for("vol1").is_err());
    }

    #[test]
    fn test_inverted_row_is_an_error() {
        let store = create_test_store();
        store
            .conn
            .execute(
                "INSERT INTO sessions (volunteer_id, start_at, end_at) \
                 VALUES ('vol1', '2024-03-10 11:00', '2024-03-10 09:00')",
                [],
            )
            .unwrap();

        let err = store.sessions_for("vol1").unwrap_err();
        assert!(matches!(
            err,
            Error::DatabaseQuery(rusqlite::Error::FromSqlConversionFailure(2, _, _))
        ));
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = std::env::temp_dir().join(format!(
            "aidplanner_sqlite_{}",
            std::process::id()
        ));
        let path = dir.join("sessions.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .append(&booking("vol1", "2024-03-10 09:00", "2024-03-10 11:00"))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.sessions_for("vol1").unwrap().len(), 1);
        drop(store);

        let _ = std::fs::remove_dir_all(dir);
    }
}
