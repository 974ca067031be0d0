//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Subcommand};

use crate::session::{parse_display, parse_display_date, parse_time};

/// Session booking commands.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Book a session interactively
    Book(BookCommand),

    /// Book a session without prompts
    Add {
        /// Volunteer identifier
        volunteer: String,

        /// Session start ("DD-MM-YYYY HH:MM")
        #[arg(short, long, value_parser = display_timestamp)]
        start: NaiveDateTime,

        /// Session end ("DD-MM-YYYY HH:MM")
        #[arg(short, long, value_parser = display_timestamp)]
        end: NaiveDateTime,
    },

    /// List a volunteer's sessions
    List {
        /// Volunteer identifier
        volunteer: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove one session
    Remove {
        /// Volunteer identifier
        volunteer: String,

        /// Start of the session to remove ("DD-MM-YYYY HH:MM")
        #[arg(short, long, value_parser = display_timestamp)]
        start: NaiveDateTime,
    },

    /// Remove every session of a volunteer
    Purge {
        /// Volunteer identifier
        volunteer: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show available start times for a date, or end times for a start
    Availability(AvailabilityCommand),
}

/// Interactive booking arguments.
#[derive(Debug, Args)]
pub struct BookCommand {
    /// Volunteer identifier
    pub volunteer: String,

    /// Book on the volunteer's behalf as an administrator
    #[arg(short, long)]
    pub admin: bool,
}

/// Availability query arguments.
#[derive(Debug, Args)]
pub struct AvailabilityCommand {
    /// Volunteer identifier
    pub volunteer: String,

    /// Date to inspect ("DD-MM-YYYY")
    #[arg(short, long, value_parser = display_date)]
    pub date: NaiveDate,

    /// Start time ("HH:MM"); lists end times instead of start times
    #[arg(short, long, value_parser = clock_time)]
    pub start: Option<NaiveTime>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn display_timestamp(input: &str) -> Result<NaiveDateTime, String> {
    parse_display(input).map_err(|e| e.to_string())
}

fn display_date(input: &str) -> Result<NaiveDate, String> {
    parse_display_date(input).map_err(|e| e.to_string())
}

fn clock_time(input: &str) -> Result<NaiveTime, String> {
    parse_time(input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_timestamp_parser() {
        let parsed = display_timestamp("10-03-2024 09:30").unwrap();
        assert_eq!(parsed.to_string(), "2024-03-10 09:30:00");

        let err = display_timestamp("2024-03-10 09:30").unwrap_err();
        assert!(err.contains("2024-03-10 09:30"));
    }

    #[test]
    fn test_display_date_parser() {
        assert_eq!(
            display_date("24-03-2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 24).unwrap()
        );
        assert!(display_date("24/03/2024").is_err());
    }

    #[test]
    fn test_clock_time_parser() {
        assert_eq!(
            clock_time("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert!(clock_time("7.30").is_err());
    }

    #[test]
    fn test_book_command_debug() {
        let cmd = BookCommand {
            volunteer: "vol1".to_string(),
            admin: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("vol1"));
        assert!(debug_str.contains("admin"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
