//! `aidplanner` - Volunteering-session planner for humanitarian aid camps
//!
//! This library provides the slot scheduler that offers volunteers valid
//! session start and end times, the interactive booking dialogue built on it,
//! and the stores that persist booked sessions.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod booking;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod planner;
pub mod session;
pub mod store;
pub mod volunteer;

pub use booking::{add_session, book_session, purge_volunteer, remove_session, Role};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use planner::{Outcome, SchedulePolicy, SessionSlotPlanner};
pub use session::{BookedInterval, Slot};
pub use store::SessionStore;
pub use volunteer::VolunteerIdRule;
