//! Availability computation for volunteering sessions.
//!
//! Every function here is pure: it takes the policy, the relevant date or
//! time, and the volunteer's current bookings, and returns what may be
//! offered. Nothing is cached between calls.
//!
//! The buffer test treats a booked session `[s, e)` as blocking every start
//! `t` with `s - buffer <= t < e + buffer`. The lower bound is inclusive and
//! the upper bound exclusive; callers rely on exactly this shape.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::session::{format_display, format_display_date, format_time, BookedInterval, Slot};

use super::policy::SchedulePolicy;

/// Why a piece of booking input was turned down.
///
/// Rejections are recoverable: the interactive flow reports them and asks
/// again in the same state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Input did not parse.
    #[error("'{input}' is not a valid {expected}")]
    Malformed {
        /// What was typed.
        input: String,
        /// The expected shape.
        expected: &'static str,
    },

    /// Date outside the bookable window.
    #[error(
        "{} is outside the booking window ({} to {})",
        date_text(.date),
        date_text(.first),
        date_text(.last)
    )]
    OutsideHorizon {
        /// The rejected date.
        date: NaiveDate,
        /// First bookable date.
        first: NaiveDate,
        /// Last bookable date.
        last: NaiveDate,
    },

    /// Start time not on the grid.
    #[error("{} is not on the {slot_minutes}-minute grid", time_text(.time))]
    OffGrid {
        /// The rejected time.
        time: NaiveDateTime,
        /// Grid spacing.
        slot_minutes: u32,
    },

    /// Start time too close to an existing session.
    #[error(
        "{} is within {buffer_minutes} minutes of the session {}",
        time_text(.time),
        .conflict
    )]
    Unavailable {
        /// The rejected start time.
        time: NaiveDateTime,
        /// The session it collides with.
        conflict: Slot,
        /// Required gap.
        buffer_minutes: u32,
    },

    /// Session length breaks the grid or the cap.
    #[error(
        "a session must last a multiple of {slot_minutes} minutes, up to {max_minutes} minutes (got {minutes})"
    )]
    BadDuration {
        /// Requested length.
        minutes: i64,
        /// Grid spacing.
        slot_minutes: u32,
        /// Longest allowed session.
        max_minutes: u32,
    },

    /// End time runs into the gap before the next session.
    #[error(
        "ending at {} leaves less than {buffer_minutes} minutes before the session {}",
        stamp_text(.end),
        .next
    )]
    TooCloseToNext {
        /// The rejected end time.
        end: NaiveDateTime,
        /// The following session.
        next: Slot,
        /// Required gap.
        buffer_minutes: u32,
    },

    /// Every start time on the date is taken.
    #[error("no start times are available on {}", date_text(.date))]
    NoStartTimes {
        /// The exhausted date.
        date: NaiveDate,
    },

    /// No end time fits after the chosen start.
    #[error("no end times are available after {}", stamp_text(.start))]
    NoEndTimes {
        /// The chosen start.
        start: NaiveDateTime,
    },

    /// Menu choice outside the offered list.
    #[error("choose a number between 1 and {count}")]
    OutOfList {
        /// How many entries were offered.
        count: usize,
    },
}

fn date_text(date: &NaiveDate) -> String {
    format_display_date(*date)
}

fn time_text(time: &NaiveDateTime) -> String {
    format_time(*time)
}

fn stamp_text(time: &NaiveDateTime) -> String {
    format_display(*time)
}

/// First and last bookable dates, inclusive.
#[must_use]
pub fn booking_window(policy: &SchedulePolicy, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today + Duration::days(1),
        today + Duration::days(i64::from(policy.horizon_days)),
    )
}

/// Accept a date only if it lies inside the booking window.
///
/// # Errors
///
/// Returns [`Rejection::OutsideHorizon`] for today, past dates and dates
/// beyond the horizon.
pub fn check_date(
    policy: &SchedulePolicy,
    today: NaiveDate,
    date: NaiveDate,
) -> Result<NaiveDate, Rejection> {
    let (first, last) = booking_window(policy, today);
    if date < first || date > last {
        return Err(Rejection::OutsideHorizon { date, first, last });
    }
    Ok(date)
}

/// Sessions whose buffered span reaches into the given date.
///
/// With the default policy this is every session that starts on the date or
/// in the first half hour of the next day, or ends on the date or in the last
/// half hour of the previous day.
#[must_use]
pub fn affected_intervals<'a>(
    policy: &SchedulePolicy,
    date: NaiveDate,
    bookings: &'a [BookedInterval],
) -> Vec<&'a BookedInterval> {
    let day_start = date.and_time(NaiveTime::MIN);
    let day_end = day_start + Duration::days(1);
    let buffer = policy.buffer();

    bookings
        .iter()
        .filter(|b| b.start - buffer < day_end && b.end + buffer > day_start)
        .collect()
}

/// Every grid point on the date.
#[must_use]
pub fn start_grid(policy: &SchedulePolicy, date: NaiveDate) -> Vec<NaiveDateTime> {
    let day_start = date.and_time(NaiveTime::MIN);
    (0..policy.slots_per_day())
        .map(|k| day_start + policy.slot() * i32::try_from(k).unwrap_or(i32::MAX))
        .collect()
}

/// The first session that blocks `time` as a start time, if any.
#[must_use]
pub fn blocking_session<'a, I>(
    policy: &SchedulePolicy,
    time: NaiveDateTime,
    bookings: I,
) -> Option<&'a BookedInterval>
where
    I: IntoIterator<Item = &'a BookedInterval>,
{
    let buffer = policy.buffer();
    bookings
        .into_iter()
        .find(|b| time >= b.start - buffer && time < b.end + buffer)
}

/// Start times that may be offered on the date.
#[must_use]
pub fn start_times(
    policy: &SchedulePolicy,
    date: NaiveDate,
    bookings: &[BookedInterval],
) -> Vec<NaiveDateTime> {
    let affected = affected_intervals(policy, date, bookings);
    start_grid(policy, date)
        .into_iter()
        .filter(|t| blocking_session(policy, *t, affected.iter().copied()).is_none())
        .collect()
}

/// Accept a start time on the date only if it is on the grid and free.
///
/// # Errors
///
/// Returns [`Rejection::OffGrid`] or [`Rejection::Unavailable`].
pub fn check_start(
    policy: &SchedulePolicy,
    time: NaiveDateTime,
    bookings: &[BookedInterval],
) -> Result<NaiveDateTime, Rejection> {
    if !policy.is_on_grid(time) {
        return Err(Rejection::OffGrid {
            time,
            slot_minutes: policy.slot_minutes,
        });
    }

    let affected = affected_intervals(policy, time.date(), bookings);
    if let Some(conflict) = blocking_session(policy, time, affected) {
        return Err(Rejection::Unavailable {
            time,
            conflict: conflict.slot(),
            buffer_minutes: policy.buffer_minutes,
        });
    }

    Ok(time)
}

/// The earliest session starting strictly after `start`.
#[must_use]
pub fn next_session(start: NaiveDateTime, bookings: &[BookedInterval]) -> Option<&BookedInterval> {
    bookings
        .iter()
        .filter(|b| b.start > start)
        .min_by_key(|b| b.start)
}

/// End times that may be offered for a session beginning at `start`.
///
/// Candidates step along the grid up to the duration cap and stop at the
/// first one that reaches the gap before the next session.
#[must_use]
pub fn end_times(
    policy: &SchedulePolicy,
    start: NaiveDateTime,
    bookings: &[BookedInterval],
) -> Vec<NaiveDateTime> {
    let limit = next_session(start, bookings).map(|next| next.start - policy.buffer());

    (1..=policy.max_steps())
        .map(|k| start + policy.slot() * i32::try_from(k).unwrap_or(i32::MAX))
        .take_while(|candidate| limit.map_or(true, |limit| *candidate < limit))
        .collect()
}

/// Validate a complete slot without the interactive flow.
///
/// # Errors
///
/// Returns the first [`Rejection`] the slot runs into, checking the date,
/// the start time, the duration and the gap before the next session in
/// that order.
pub fn check_slot(
    policy: &SchedulePolicy,
    today: NaiveDate,
    slot: Slot,
    bookings: &[BookedInterval],
) -> Result<Slot, Rejection> {
    check_date(policy, today, slot.start.date())?;
    check_start(policy, slot.start, bookings)?;

    let minutes = slot.duration().num_minutes();
    let slot_minutes = i64::from(policy.slot_minutes);
    if minutes <= 0
        || minutes % slot_minutes != 0
        || minutes > i64::from(policy.max_session_minutes)
    {
        return Err(Rejection::BadDuration {
            minutes,
            slot_minutes: policy.slot_minutes,
            max_minutes: policy.max_session_minutes,
        });
    }

    if let Some(next) = next_session(slot.start, bookings) {
        if slot.end >= next.start - policy.buffer() {
            return Err(Rejection::TooCloseToNext {
                end: slot.end,
                next: next.slot(),
                buffer_minutes: policy.buffer_minutes,
            });
        }
    }

    Ok(slot)
}
