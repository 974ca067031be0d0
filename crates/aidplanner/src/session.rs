//! Core session types for aidplanner.
//!
//! This module defines the booked volunteering session record and the two
//! timestamp forms it travels in: the sortable storage form
//! (`YYYY-MM-DD HH:mm`) and the human-facing display form
//! (`DD-MM-YYYY HH:mm`).

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp format used internally and in persisted tables.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Timestamp format shown to and typed by people.
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Date format shown to and typed by people.
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Time-of-day format.
pub const TIME_FORMAT: &str = "%H:%M";

/// A start/end pair chosen by the planner, not yet owned by a volunteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    /// When the session begins.
    pub start: NaiveDateTime,
    /// When the session ends.
    pub end: NaiveDateTime,
}

impl Slot {
    /// Create a slot from its bounds.
    #[must_use]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Length of the slot.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} ({})",
            format_display(self.start),
            format_display(self.end),
            format_duration(self.duration())
        )
    }
}

/// One committed volunteering session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookedInterval {
    /// Opaque identifier of the volunteer owning the session.
    pub volunteer_id: String,

    /// When the session begins.
    #[serde(with = "storage_timestamp")]
    pub start: NaiveDateTime,

    /// When the session ends.
    #[serde(with = "storage_timestamp")]
    pub end: NaiveDateTime,
}

impl BookedInterval {
    /// Create a booked interval.
    ///
    /// Only the ordering of the bounds is checked here; grid and duration
    /// rules belong to [`crate::planner::SchedulePolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInterval`] if `start` is not before `end`.
    pub fn new(
        volunteer_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self> {
        if start >= end {
            return Err(Error::invalid_interval(format!(
                "start {} must precede end {}",
                format_storage(start),
                format_storage(end)
            )));
        }
        Ok(Self {
            volunteer_id: volunteer_id.into(),
            start,
            end,
        })
    }

    /// Attach a planner slot to a volunteer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInterval`] if the slot is empty or inverted.
    pub fn from_slot(volunteer_id: impl Into<String>, slot: Slot) -> Result<Self> {
        Self::new(volunteer_id, slot.start, slot.end)
    }

    /// The start/end pair without the owner.
    #[must_use]
    pub fn slot(&self) -> Slot {
        Slot::new(self.start, self.end)
    }

    /// Length of the session.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for BookedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.slot().fmt(f)
    }
}

/// Render a timestamp in storage form.
#[must_use]
pub fn format_storage(timestamp: NaiveDateTime) -> String {
    timestamp.format(STORAGE_FORMAT).to_string()
}

/// Render a timestamp in display form.
#[must_use]
pub fn format_display(timestamp: NaiveDateTime) -> String {
    timestamp.format(DISPLAY_FORMAT).to_string()
}

/// Render a date in display form.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Render a time of day as `HH:mm`.
#[must_use]
pub fn format_time(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIME_FORMAT).to_string()
}

/// Parse a storage-form timestamp.
///
/// # Errors
///
/// Returns [`Error::TimestampParse`] if the input is not `YYYY-MM-DD HH:mm`.
pub fn parse_storage(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), STORAGE_FORMAT).map_err(|_| {
        Error::TimestampParse {
            input: input.to_string(),
            expected: "YYYY-MM-DD HH:mm",
        }
    })
}

/// Parse a display-form timestamp.
///
/// # Errors
///
/// Returns [`Error::TimestampParse`] if the input is not `DD-MM-YYYY HH:mm`.
pub fn parse_display(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DISPLAY_FORMAT).map_err(|_| {
        Error::TimestampParse {
            input: input.to_string(),
            expected: "DD-MM-YYYY HH:mm",
        }
    })
}

/// Parse a display-form date.
///
/// # Errors
///
/// Returns [`Error::TimestampParse`] if the input is not `DD-MM-YYYY`.
pub fn parse_display_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DISPLAY_DATE_FORMAT).map_err(|_| {
        Error::TimestampParse {
            input: input.to_string(),
            expected: "DD-MM-YYYY",
        }
    })
}

/// Parse a time of day.
///
/// # Errors
///
/// Returns [`Error::TimestampParse`] if the input is not `HH:mm`.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT).map_err(|_| Error::TimestampParse {
        input: input.to_string(),
        expected: "HH:mm",
    })
}

/// Describe a duration as whole hours plus remaining minutes.
///
/// ```
/// use aidplanner::session::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(Duration::minutes(150)), "2 hours 30 minutes");
/// assert_eq!(format_duration(Duration::minutes(60)), "1 hour");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_minutes();
    let hours = total / 60;
    let minutes = total % 60;

    let hour_part = match hours {
        0 => None,
        1 => Some("1 hour".to_string()),
        n => Some(format!("{n} hours")),
    };
    let minute_part = (minutes != 0).then(|| format!("{minutes} minutes"));

    match (hour_part, minute_part) {
        (Some(h), Some(m)) => format!("{h} {m}"),
        (Some(h), None) => h,
        (None, Some(m)) => m,
        (None, None) => "0 minutes".to_string(),
    }
}

mod storage_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::STORAGE_FORMAT;

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.format(STORAGE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, STORAGE_FORMAT).map_err(serde::de::Error::custom)
    }
}
