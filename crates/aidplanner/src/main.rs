//! `aidplan` - CLI for aidplanner
//!
//! This binary books, lists and removes volunteering sessions and exposes
//! the planner's availability rules on the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use aidplanner::cli::{AvailabilityCommand, Cli, Command, ConfigCommand, SessionCommand};
use aidplanner::planner::{time_table, Console, LineConsole};
use aidplanner::session::{format_display, format_display_date};
use aidplanner::{
    add_session, book_session, init_logging, purge_volunteer, remove_session, store, Config,
    Role, SessionSlotPlanner, SessionStore, Slot, VolunteerIdRule,
};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let result = match cli.command {
        Command::Session(session_cmd) => Config::load_from(cli.config)
            .context("failed to load configuration")
            .and_then(|config| handle_session(&config, session_cmd)),
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    };

    match result {
        Err(err) if is_input_rejection(&err) => {
            eprintln!("Rejected: {err}");
            Ok(ExitCode::from(INPUT_REJECTED))
        }
        Err(err) => Err(err),
        Ok(()) => Ok(ExitCode::SUCCESS),
    }
}

/// Exit status for bad booking input, as opposed to environmental failures.
const INPUT_REJECTED: u8 = 2;

fn is_input_rejection(err: &anyhow::Error) -> bool {
    err.downcast_ref::<aidplanner::Error>()
        .is_some_and(aidplanner::Error::is_rejection)
}

fn handle_session(config: &Config, cmd: SessionCommand) -> anyhow::Result<()> {
    let rule = VolunteerIdRule::from_config(config)?;
    let store = store::open(config)?;
    let planner = SessionSlotPlanner::new(config.schedule, Local::now().date_naive());

    match cmd {
        SessionCommand::Book(book) => {
            let volunteer_id = rule.check(&book.volunteer)?;
            let role = if book.admin {
                Role::Administrator
            } else {
                Role::Volunteer
            };
            let stdin = io::stdin();
            let mut console = LineConsole::new(stdin.lock(), io::stdout());
            book_session(store.as_ref(), &planner, &mut console, volunteer_id, role)?;
        }
        SessionCommand::Add {
            volunteer,
            start,
            end,
        } => {
            let volunteer_id = rule.check(&volunteer)?;
            let interval = add_session(
                store.as_ref(),
                &planner,
                volunteer_id,
                Slot::new(start, end),
            )?;
            println!("Session booked: {interval}");
        }
        SessionCommand::List { volunteer, json } => {
            let volunteer_id = rule.check(&volunteer)?;
            let sessions = store.sessions_for(volunteer_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No sessions booked for {volunteer_id}.");
            } else {
                println!("Sessions for {volunteer_id}:");
                for session in &sessions {
                    println!("  {}", session.slot());
                }
            }
        }
        SessionCommand::Remove { volunteer, start } => {
            let volunteer_id = rule.check(&volunteer)?;
            remove_session(store.as_ref(), volunteer_id, start)?;
            println!(
                "Removed session of {volunteer_id} starting {}.",
                format_display(start)
            );
        }
        SessionCommand::Purge { volunteer, yes } => {
            let volunteer_id = rule.check(&volunteer)?;
            handle_purge(store.as_ref(), volunteer_id, yes)?;
        }
        SessionCommand::Availability(query) => {
            let volunteer_id = rule.check(&query.volunteer)?.to_string();
            handle_availability(store.as_ref(), &planner, &volunteer_id, &query)?;
        }
    }
    Ok(())
}

fn handle_purge(store: &dyn SessionStore, volunteer_id: &str, yes: bool) -> anyhow::Result<()> {
    let count = store.sessions_for(volunteer_id)?.len();
    if count == 0 {
        println!("No sessions booked for {volunteer_id}.");
        return Ok(());
    }

    if !yes {
        let stdin = io::stdin();
        let mut console = LineConsole::new(stdin.lock(), io::stdout());
        let answer = console.ask(&format!(
            "Remove all {count} sessions of {volunteer_id}? [y/N]"
        ))?;
        let confirmed = answer.is_some_and(|a| matches!(a.trim(), "y" | "Y" | "yes"));
        if !confirmed {
            println!("Nothing removed.");
            return Ok(());
        }
    }

    let removed = purge_volunteer(store, volunteer_id)?;
    println!("Removed {removed} sessions of {volunteer_id}.");
    Ok(())
}

fn handle_availability(
    store: &dyn SessionStore,
    planner: &SessionSlotPlanner,
    volunteer_id: &str,
    query: &AvailabilityCommand,
) -> anyhow::Result<()> {
    let bookings = store.sessions_for(volunteer_id)?;
    let date = planner
        .check_date(query.date)
        .map_err(aidplanner::Error::from)?;

    let mut out = io::stdout().lock();
    match query.start {
        None => {
            let times = planner.start_times(date, &bookings);
            if times.is_empty() {
                writeln!(out, "No start times available on {}.", format_display_date(date))?;
            } else {
                writeln!(out, "Start times on {}:", format_display_date(date))?;
                for row in time_table(&times).lines() {
                    writeln!(out, "  {row}")?;
                }
            }
        }
        Some(time) => {
            let start = planner
                .check_start(date.and_time(time), &bookings)
                .map_err(aidplanner::Error::from)?;
            let ends = planner.end_times(start, &bookings);
            if ends.is_empty() {
                writeln!(out, "No end times available after {}.", format_display(start))?;
            } else {
                writeln!(out, "End times for a session starting {}:", format_display(start))?;
                for end in ends {
                    writeln!(out, "  {}", format_display(end))?;
                }
            }
        }
    }
    Ok(())
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let schedule = &config.schedule;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Sessions table:     {}", config.sessions_path().display());
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Schedule]");
                println!("  Horizon (days):     {}", schedule.horizon_days);
                println!("  Slot (minutes):     {}", schedule.slot_minutes);
                println!("  Buffer (minutes):   {}", schedule.buffer_minutes);
                println!("  Max session (min):  {}", schedule.max_session_minutes);
                println!();
                println!("[Volunteers]");
                println!("  Id pattern:         {}", config.volunteers.id_pattern);
            }
        }
        ConfigCommand::Path => {
            let path = path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let target = file.or(path);
            let shown = target
                .clone()
                .unwrap_or_else(Config::default_config_path);
            match Config::load_from(target) {
                Ok(_) => println!("Configuration is valid: {}", shown.display()),
                Err(e) => {
                    eprintln!("Configuration is invalid: {}", shown.display());
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}
