//! Persistence for booked volunteering sessions.
//!
//! The planner only ever needs three things from storage: a volunteer's
//! current sessions, appending one session, and removing one session. Those
//! operations are captured by [`SessionStore`] so the storage strategy can
//! change without touching scheduling logic.
//!
//! Two stores are provided:
//! - [`FlatFileStore`]: a delimited text table, read whole and rewritten whole
//!   on every change.
//! - [`SqliteStore`]: a `SQLite` table with schema versioning.

mod flat_file;
pub mod sqlite;

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::session::BookedInterval;

pub use flat_file::{FlatFileStore, HEADER};
pub use sqlite::SqliteStore;

/// Storage for booked sessions.
pub trait SessionStore: std::fmt::Debug {
    /// Short name of the backend (for logging/status output).
    fn backend(&self) -> &'static str;

    /// All sessions of one volunteer, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn sessions_for(&self, volunteer_id: &str) -> Result<Vec<BookedInterval>>;

    /// Add one session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn append(&self, interval: &BookedInterval) -> Result<()>;

    /// Remove the session of `volunteer_id` starting exactly at `start`.
    ///
    /// Returns `true` if a session was removed, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    fn remove(&self, volunteer_id: &str, start: NaiveDateTime) -> Result<bool>;

    /// Remove every session of a volunteer.
    ///
    /// Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    fn remove_all_for(&self, volunteer_id: &str) -> Result<usize>;
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or initialized.
pub fn open(config: &Config) -> Result<Box<dyn SessionStore>> {
    let store: Box<dyn SessionStore> = match config.storage.backend {
        StorageBackend::FlatFile => Box::new(FlatFileStore::open(config.sessions_path())?),
        StorageBackend::Sqlite => Box::new(SqliteStore::open(config.database_path())?),
    };
    info!(
        backend = store.backend(),
        path = %config.store_path().display(),
        "session store ready"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(backend: StorageBackend, tag: &str) -> Config {
        let dir = std::env::temp_dir().join(format!(
            "aidplanner_store_open_{tag}_{}",
            std::process::id()
        ));
        let mut config = Config::default();
        config.storage.backend = backend;
        config.storage.sessions_path = Some(dir.join("sessions.csv"));
        config.storage.database_path = Some(dir.join("sessions.db"));
        config
    }

    #[test]
    fn test_open_selects_backend() {
        let flat = temp_config(StorageBackend::FlatFile, "flat");
        let store = open(&flat).unwrap();
        assert_eq!(store.backend(), "flat_file");
        assert!(flat.sessions_path().exists());

        let sqlite = temp_config(StorageBackend::Sqlite, "sqlite");
        let store = open(&sqlite).unwrap();
        assert_eq!(store.backend(), "sqlite");
        drop(store);

        for config in [flat, sqlite] {
            if let Some(dir) = config.sessions_path().parent() {
                let _ = std::fs::remove_dir_all(dir);
            }
        }
    }
}
