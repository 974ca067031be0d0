//! Booking operations on top of the planner and a session store.
//!
//! Administrators and volunteers book through the same dialogue; the role
//! only changes the heading shown to the person at the keyboard.

use std::fmt;

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{Error, Result};
use crate::planner::{Console, Outcome, SessionSlotPlanner};
use crate::session::{format_display, BookedInterval, Slot};
use crate::store::SessionStore;

/// Who is driving the booking dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// An administrator booking on a volunteer's behalf.
    Administrator,
    /// A volunteer booking for themselves.
    #[default]
    Volunteer,
}

impl Role {
    /// Heading label for this role.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Volunteer => "Volunteer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run the booking dialogue and commit the confirmed slot.
///
/// The store is only written when the dialogue ends with a confirmed slot;
/// backing out or cancelling leaves it untouched.
///
/// # Errors
///
/// Returns an error if the store or the console fails.
pub fn book_session(
    store: &dyn SessionStore,
    planner: &SessionSlotPlanner,
    console: &mut dyn Console,
    volunteer_id: &str,
    role: Role,
) -> Result<Outcome> {
    let bookings = store.sessions_for(volunteer_id)?;
    console.say(&format!("{role} session booking for {volunteer_id}"))?;

    let outcome = planner.run(console, volunteer_id, &bookings)?;
    match outcome {
        Outcome::Booked(slot) => {
            let interval = BookedInterval::from_slot(volunteer_id, slot)?;
            store.append(&interval)?;
            info!(volunteer_id, role = role.label(), %slot, "session booked");
            console.say(&format!("Session booked: {slot}"))?;
        }
        Outcome::BackedOut | Outcome::Cancelled => {
            console.say("No session booked.")?;
        }
    }
    Ok(outcome)
}

/// Book a slot without the dialogue, subject to the same rules.
///
/// # Errors
///
/// Returns [`Error::SlotRejected`] naming the violated constraint, or a
/// storage error.
pub fn add_session(
    store: &dyn SessionStore,
    planner: &SessionSlotPlanner,
    volunteer_id: &str,
    slot: Slot,
) -> Result<BookedInterval> {
    let bookings = store.sessions_for(volunteer_id)?;
    let slot = planner.check_slot(slot, &bookings)?;

    let interval = BookedInterval::from_slot(volunteer_id, slot)?;
    store.append(&interval)?;
    info!(volunteer_id, %slot, "session added");
    Ok(interval)
}

/// Remove the session of a volunteer starting at `start`.
///
/// # Errors
///
/// Returns [`Error::SessionNotFound`] if no session starts there.
pub fn remove_session(
    store: &dyn SessionStore,
    volunteer_id: &str,
    start: NaiveDateTime,
) -> Result<()> {
    if store.remove(volunteer_id, start)? {
        Ok(())
    } else {
        Err(Error::SessionNotFound {
            volunteer_id: volunteer_id.to_string(),
            start: format_display(start),
        })
    }
}

/// Remove every session of a volunteer, as when the volunteer is removed.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn purge_volunteer(store: &dyn SessionStore, volunteer_id: &str) -> Result<usize> {
    store.remove_all_for(volunteer_id)
}
