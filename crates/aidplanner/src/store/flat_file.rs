//! Delimited text table of booked sessions.
//!
//! The table has a header row followed by one `volunteer_id,start,end` row
//! per session, timestamps in storage form. Every mutation reads the whole
//! table, changes it in memory and writes it back.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::session::{format_storage, parse_storage, BookedInterval};

use super::SessionStore;

/// Header row of the sessions table.
pub const HEADER: &str = "volunteer_id,start,end";

const DELIMITER: char = ',';

/// Sessions kept in a delimited text file.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    path: PathBuf,
}

impl FlatFileStore {
    /// Open the table at `path`, creating it (and its parent directories)
    /// with just a header row if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or file cannot be created.
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

        let store = Self { path };
        if !store.path.exists() {
            debug!("Creating sessions table at {}", store.path.display());
            store.write_all(&[])?;
        }
        Ok(store)
    }

    /// Get the path to the table file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a row is malformed.
    pub fn read_all(&self) -> Result<Vec<BookedInterval>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let mut rows = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || (index == 0 && line == HEADER) {
                continue;
            }
            rows.push(self.parse_row(index + 1, line)?);
        }

        Ok(rows)
    }

    /// Replace the whole table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_all(&self, rows: &[BookedInterval]) -> Result<()> {
        let mut contents = String::from(HEADER);
        contents.push('\n');
        for row in rows {
            contents.push_str(&format!(
                "{}{DELIMITER}{}{DELIMITER}{}\n",
                row.volunteer_id,
                format_storage(row.start),
                format_storage(row.end)
            ));
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn parse_row(&self, line_no: usize, line: &str) -> Result<BookedInterval> {
        let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        let [volunteer_id, start, end] = fields.as_slice() else {
            return Err(Error::corrupt_record(
                &self.path,
                line_no,
                format!("expected 3 fields, found {}", fields.len()),
            ));
        };

        let start = parse_storage(start)
            .map_err(|e| Error::corrupt_record(&self.path, line_no, e.to_string()))?;
        let end = parse_storage(end)
            .map_err(|e| Error::corrupt_record(&self.path, line_no, e.to_string()))?;

        BookedInterval::new(*volunteer_id, start, end)
            .map_err(|e| Error::corrupt_record(&self.path, line_no, e.to_string()))
    }
}

fn check_field(volunteer_id: &str) -> Result<()> {
    if volunteer_id.is_empty() || volunteer_id.contains([DELIMITER, '\n', '\r']) {
        return Err(Error::InvalidVolunteerId {
            id: volunteer_id.to_string(),
        });
    }
    Ok(())
}

impl SessionStore for FlatFileStore {
    fn backend(&self) -> &'static str {
        "flat_file"
    }

    fn sessions_for(&self, volunteer_id: &str) -> Result<Vec<BookedInterval>> {
        let mut sessions: Vec<BookedInterval> = self
            .read_all()?
            .into_iter()
            .filter(|row| row.volunteer_id == volunteer_id)
            .collect();
        sessions.sort_by_key(|row| row.start);
        Ok(sessions)
    }

    fn append(&self, interval: &BookedInterval) -> Result<()> {
        check_field(&interval.volunteer_id)?;

        let mut rows = self.read_all()?;
        rows.push(interval.clone());
        self.write_all(&rows)?;

        info!(
            volunteer_id = %interval.volunteer_id,
            start = %format_storage(interval.start),
            end = %format_storage(interval.end),
            "session appended"
        );
        Ok(())
    }

    fn remove(&self, volunteer_id: &str, start: NaiveDateTime) -> Result<bool> {
        let mut rows = self.read_all()?;
        let before = rows.len();
        rows.retain(|row| !(row.volunteer_id == volunteer_id && row.start == start));

        if rows.len() == before {
            return Ok(false);
        }
        self.write_all(&rows)?;
        info!(volunteer_id, start = %format_storage(start), "session removed");
        Ok(true)
    }

    fn remove_all_for(&self, volunteer_id: &str) -> Result<usize> {
        let mut rows = self.read_all()?;
        let before = rows.len();
        rows.retain(|row| row.volunteer_id != volunteer_id);

        let removed = before - rows.len();
        if removed > 0 {
            self.write_all(&rows)?;
            info!(volunteer_id, removed, "sessions purged");
        }
        Ok(removed)
    }
}
