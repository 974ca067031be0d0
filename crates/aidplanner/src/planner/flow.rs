//! The interactive booking dialogue.
//!
//! States run `Date -> Start -> End -> Confirm`. Each prompt either advances,
//! steps back one state, or cancels. Running out of start times on a date
//! sends the volunteer back to date selection; running out of end times
//! sends them back to start selection.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::Result;
use crate::session::{
    format_display, format_display_date, format_duration, format_time, parse_display_date,
    parse_time, BookedInterval, Slot,
};

use super::availability::{check_start, Rejection};
use super::console::{Console, Step};
use super::{Outcome, SessionSlotPlanner};

const LIST_WORDS: &[&str] = &["l", "list"];
const CONFIRM_WORDS: &[&str] = &["y", "yes"];
const TIMES_PER_ROW: usize = 8;

#[derive(Debug, Clone, Copy)]
enum State {
    Date,
    Start(NaiveDate),
    End(NaiveDateTime),
    Confirm(Slot),
}

impl SessionSlotPlanner {
    /// Run the booking dialogue for one volunteer.
    ///
    /// `bookings` are the volunteer's existing sessions. Nothing is
    /// persisted here: a [`Outcome::Booked`] slot still has to be committed
    /// by the caller.
    ///
    /// # Errors
    ///
    /// Only console I/O failures are returned. Bad input is reported on the
    /// console and asked for again.
    pub fn run(
        &self,
        console: &mut dyn Console,
        volunteer_id: &str,
        bookings: &[BookedInterval],
    ) -> Result<Outcome> {
        let mut state = State::Date;

        loop {
            debug!(?state, volunteer_id, "planner state");
            state = match state {
                State::Date => match self.ask_date(console, volunteer_id, bookings)? {
                    Step::Accepted(date) => State::Start(date),
                    Step::Back => return Ok(Outcome::BackedOut),
                    Step::Cancel => return Ok(Outcome::Cancelled),
                },

                State::Start(date) => {
                    let times = self.start_times(date, bookings);
                    if times.is_empty() {
                        console.say(&format!(
                            "Unavailable: {}. Going back to date selection.",
                            Rejection::NoStartTimes { date }
                        ))?;
                        State::Date
                    } else {
                        match self.ask_start(console, date, &times, bookings)? {
                            Step::Accepted(start) => State::End(start),
                            Step::Back => State::Date,
                            Step::Cancel => return Ok(Outcome::Cancelled),
                        }
                    }
                }

                State::End(start) => {
                    let ends = self.end_times(start, bookings);
                    if ends.is_empty() {
                        console.say(&format!(
                            "Unavailable: {}. Going back to start time selection.",
                            Rejection::NoEndTimes { start }
                        ))?;
                        State::Start(start.date())
                    } else {
                        match ask_end(console, start, &ends)? {
                            Step::Accepted(end) => State::Confirm(Slot::new(start, end)),
                            Step::Back => State::Start(start.date()),
                            Step::Cancel => return Ok(Outcome::Cancelled),
                        }
                    }
                }

                State::Confirm(slot) => match ask_confirm(console, slot)? {
                    Step::Accepted(()) => return Ok(Outcome::Booked(slot)),
                    Step::Back => State::End(slot.start),
                    Step::Cancel => return Ok(Outcome::Cancelled),
                },
            };
        }
    }

    fn ask_date(
        &self,
        console: &mut dyn Console,
        volunteer_id: &str,
        bookings: &[BookedInterval],
    ) -> Result<Step<NaiveDate>> {
        if bookings.is_empty() {
            console.say(&format!("{volunteer_id} has no sessions booked."))?;
        } else {
            console.say(&format!("Sessions already booked for {volunteer_id}:"))?;
            for booking in bookings {
                console.say(&format!("  {booking}"))?;
            }
        }

        let (first, last) = self.booking_window();
        console.say(&format!(
            "Sessions can be booked from {} to {}.",
            format_display_date(first),
            format_display_date(last)
        ))?;

        prompt(
            console,
            "Date (DD-MM-YYYY, 'b' to go back, 'c' to cancel):",
            |input| {
                let date = parse_display_date(input).map_err(|_| {
                    invalid(&Rejection::Malformed {
                        input: input.to_string(),
                        expected: "date (DD-MM-YYYY)",
                    })
                })?;
                self.check_date(date).map_err(|rejection| invalid(&rejection))
            },
        )
    }

    fn ask_start(
        &self,
        console: &mut dyn Console,
        date: NaiveDate,
        times: &[NaiveDateTime],
        bookings: &[BookedInterval],
    ) -> Result<Step<NaiveDateTime>> {
        if let (Some(first), Some(last)) = (times.first(), times.last()) {
            console.say(&format!(
                "{} start times are free on {}, between {} and {}. Type 'list' to see them all.",
                times.len(),
                format_display_date(date),
                format_time(*first),
                format_time(*last)
            ))?;
        }

        prompt(
            console,
            "Start time (HH:mm, 'b' to go back, 'c' to cancel):",
            |input| {
                if LIST_WORDS.contains(&input.to_ascii_lowercase().as_str()) {
                    return Err(time_table(times));
                }
                let time = parse_time(input).map_err(|_| {
                    invalid(&Rejection::Malformed {
                        input: input.to_string(),
                        expected: "time (HH:mm)",
                    })
                })?;
                check_start(self.policy(), date.and_time(time), bookings)
                    .map_err(|rejection| invalid(&rejection))
            },
        )
    }
}

fn ask_end(
    console: &mut dyn Console,
    start: NaiveDateTime,
    ends: &[NaiveDateTime],
) -> Result<Step<NaiveDateTime>> {
    console.say(&format!(
        "End times for a session starting {}:",
        format_display(start)
    ))?;
    for (index, end) in ends.iter().enumerate() {
        let shown = if end.date() == start.date() {
            format_time(*end)
        } else {
            format_display(*end)
        };
        console.say(&format!(
            "  {}) {} ({})",
            index + 1,
            shown,
            format_duration(*end - start)
        ))?;
    }

    prompt(
        console,
        "End time number ('b' to go back, 'c' to cancel):",
        |input| {
            let choice: usize = input.parse().map_err(|_| {
                invalid(&Rejection::Malformed {
                    input: input.to_string(),
                    expected: "number",
                })
            })?;
            choice
                .checked_sub(1)
                .and_then(|index| ends.get(index))
                .copied()
                .ok_or_else(|| invalid(&Rejection::OutOfList { count: ends.len() }))
        },
    )
}

fn ask_confirm(console: &mut dyn Console, slot: Slot) -> Result<Step<()>> {
    console.say(&format!("New session: {slot}"))?;

    prompt(
        console,
        "Confirm booking? ('y' to confirm, 'b' to go back, 'c' to cancel):",
        |input| {
            if CONFIRM_WORDS.contains(&input.to_ascii_lowercase().as_str()) {
                Ok(())
            } else {
                Err("Please answer 'y', 'b' or 'c'.".to_string())
            }
        },
    )
}

/// Ask until the input parses or a navigation word is typed.
///
/// `parse` returns the message to show when the input is turned down.
/// End of input counts as a cancel.
fn prompt<T>(
    console: &mut dyn Console,
    question: &str,
    mut parse: impl FnMut(&str) -> std::result::Result<T, String>,
) -> Result<Step<T>> {
    loop {
        let Some(line) = console.ask(question)? else {
            return Ok(Step::Cancel);
        };
        if let Some(step) = Step::navigation(&line) {
            return Ok(step);
        }
        match parse(line.trim()) {
            Ok(value) => return Ok(Step::Accepted(value)),
            Err(message) => console.say(&message)?,
        }
    }
}

fn invalid(rejection: &Rejection) -> String {
    format!("Invalid input: {rejection}.")
}

/// Clock times laid out in rows of eight, two spaces apart.
#[must_use]
pub fn time_table(times: &[NaiveDateTime]) -> String {
    times
        .chunks(TIMES_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|t| format_time(*t))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
