//! Volunteering-session slot planner.
//!
//! The planner walks one volunteer through choosing a date, a start time, an
//! end time and a final confirmation. It reads the volunteer's existing
//! bookings and hands back either an accepted [`Slot`] or a signal that the
//! volunteer backed out or cancelled. It never writes anything; committing
//! the slot is the caller's job.
//!
//! # Example
//!
//! ```
//! use aidplanner::planner::{Outcome, SchedulePolicy, SessionSlotPlanner};
//! use aidplanner::planner::LineConsole;
//! use chrono::NaiveDate;
//! use std::io::Cursor;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
//! let planner = SessionSlotPlanner::new(SchedulePolicy::default(), today);
//!
//! let script = "10-03-2024\n12:00\n2\ny\n";
//! let mut console = LineConsole::new(Cursor::new(script), Vec::new());
//!
//! let outcome = planner.run(&mut console, "vol1", &[]).unwrap();
//! assert!(matches!(outcome, Outcome::Booked(_)));
//! ```

mod availability;
mod console;
mod flow;
mod policy;

use chrono::{NaiveDate, NaiveDateTime};

use crate::session::{BookedInterval, Slot};

pub use availability::{
    affected_intervals, blocking_session, booking_window, check_date, check_slot, check_start,
    end_times, next_session, start_grid, start_times, Rejection,
};
pub use console::{Console, LineConsole, Step, BACK_WORDS, CANCEL_WORDS};
pub use flow::time_table;
pub use policy::SchedulePolicy;

/// How a planner run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The volunteer confirmed this slot.
    Booked(Slot),
    /// The volunteer stepped back past the first prompt.
    BackedOut,
    /// The volunteer cancelled.
    Cancelled,
}

impl Outcome {
    /// The confirmed slot, if any.
    #[must_use]
    pub fn slot(self) -> Option<Slot> {
        match self {
            Self::Booked(slot) => Some(slot),
            Self::BackedOut | Self::Cancelled => None,
        }
    }
}

/// Computes availability for one volunteer and runs the booking dialogue.
///
/// The planner is anchored to a fixed `today` so that the booking window
/// does not drift while a dialogue is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSlotPlanner {
    policy: SchedulePolicy,
    today: NaiveDate,
}

impl SessionSlotPlanner {
    /// Create a planner for the given policy and calendar date.
    #[must_use]
    pub fn new(policy: SchedulePolicy, today: NaiveDate) -> Self {
        Self { policy, today }
    }

    /// The policy this planner enforces.
    #[must_use]
    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    /// The date the booking window is measured from.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// First and last bookable dates.
    #[must_use]
    pub fn booking_window(&self) -> (NaiveDate, NaiveDate) {
        booking_window(&self.policy, self.today)
    }

    /// Accept a date inside the booking window.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::OutsideHorizon`] for any other date.
    pub fn check_date(&self, date: NaiveDate) -> Result<NaiveDate, Rejection> {
        check_date(&self.policy, self.today, date)
    }

    /// Start times available on a date.
    #[must_use]
    pub fn start_times(&self, date: NaiveDate, bookings: &[BookedInterval]) -> Vec<NaiveDateTime> {
        start_times(&self.policy, date, bookings)
    }

    /// Accept a start time if it is on the grid and clear of every booking.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::OffGrid`] or [`Rejection::Unavailable`].
    pub fn check_start(
        &self,
        start: NaiveDateTime,
        bookings: &[BookedInterval],
    ) -> Result<NaiveDateTime, Rejection> {
        check_start(&self.policy, start, bookings)
    }

    /// End times available for a start.
    #[must_use]
    pub fn end_times(
        &self,
        start: NaiveDateTime,
        bookings: &[BookedInterval],
    ) -> Vec<NaiveDateTime> {
        end_times(&self.policy, start, bookings)
    }

    /// Validate a whole slot at once.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] the slot runs into.
    pub fn check_slot(&self, slot: Slot, bookings: &[BookedInterval]) -> Result<Slot, Rejection> {
        check_slot(&self.policy, self.today, slot, bookings)
    }
}
