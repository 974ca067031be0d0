//! Error types for aidplanner.
//!
//! This module defines all error types used throughout the aidplanner crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::planner::Rejection;

/// The main error type for aidplanner operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A row in the sessions table could not be parsed.
    #[error("corrupt record in {path} at line {line}: {message}")]
    CorruptRecord {
        /// Path to the table file.
        path: PathBuf,
        /// One-based line number of the bad row.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// A booked interval violates the session shape rules.
    #[error("invalid session interval: {message}")]
    InvalidInterval {
        /// Which rule was broken.
        message: String,
    },

    /// A volunteer identifier does not match the configured pattern.
    #[error("invalid volunteer identifier '{id}'")]
    InvalidVolunteerId {
        /// The rejected identifier.
        id: String,
    },

    /// A requested slot cannot be booked.
    #[error("slot rejected: {0}")]
    SlotRejected(#[from] Rejection),

    /// No session matched a removal request.
    #[error("no session for volunteer '{volunteer_id}' starting at {start}")]
    SessionNotFound {
        /// The volunteer whose session was requested.
        volunteer_id: String,
        /// Start timestamp in display form.
        start: String,
    },

    /// A timestamp or date could not be parsed.
    #[error("cannot parse '{input}': expected {expected}")]
    TimestampParse {
        /// The rejected input.
        input: String,
        /// The expected format.
        expected: &'static str,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for aidplanner operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid interval error.
    #[must_use]
    pub fn invalid_interval(message: impl Into<String>) -> Self {
        Self::InvalidInterval {
            message: message.into(),
        }
    }

    /// Create a corrupt record error.
    #[must_use]
    pub fn corrupt_record(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::CorruptRecord {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Check if this error is a rejection of user-supplied booking input.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SlotRejected(_)
                | Self::InvalidInterval { .. }
                | Self::InvalidVolunteerId { .. }
                | Self::TimestampParse { .. }
        )
    }
}
