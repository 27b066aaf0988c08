//! `rdv` CLI — appointment conflict checks and waiting-room ordering from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # End time of a 45-minute appointment
//! rdv end-time --start 09:15 --duration 45
//!
//! # Would a 09:15 booking clash with practitioner 1's day?
//! rdv conflict -i bookings.json --practitioner 1 --date 2025-12-30 --start 09:15
//!
//! # Start times still free on that day
//! rdv slots -i bookings.json --practitioner 1 --date 2025-12-30
//!
//! # Double-bookings already persisted
//! rdv audit -i bookings.json
//!
//! # Waiting-room order at a given instant, calling the next patient
//! rdv queue -i waiting.json --now 2026-03-16T10:00:00 --call-next
//! ```
//!
//! Records are read as JSON from `-i FILE` or stdin; results are written to
//! stdout as JSON. Logs go to stderr, filtered by `RUST_LOG`.

mod config;

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rdv_engine::waiting::parse_local_datetime;
use rdv_engine::{
    available_starts, end_time, find_conflicts, first_conflict, Booking, BookingId, EngineConfig,
    EntryId, PractitionerId, ProposedSlot, TimeOfDay, WaitingEntry, WaitingRoom,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rdv",
    version,
    about = "Appointment conflict checks and waiting-room ordering"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the end time of an appointment
    EndTime {
        /// Start time (HH:MM)
        #[arg(long)]
        start: TimeOfDay,
        /// Duration in minutes (configured default if omitted)
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Check a proposed booking against existing ones
    Conflict {
        /// Bookings JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        practitioner: PractitionerId,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Start time (HH:MM)
        #[arg(long)]
        start: TimeOfDay,
        /// Duration in minutes (configured default if omitted)
        #[arg(long)]
        duration: Option<u32>,
        /// Id of the booking being edited, excluded from the check
        #[arg(long)]
        exclude: Option<BookingId>,
    },
    /// List configured start times still free for a practitioner
    Slots {
        /// Bookings JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        practitioner: PractitionerId,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Duration in minutes (configured default if omitted)
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Report overlapping bookings already present in a list
    Audit {
        /// Bookings JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Order a waiting room and optionally call a patient
    Queue {
        /// Waiting entries JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Current local time (YYYY-MM-DDTHH:MM:SS, or RFC 3339 with an offset)
        #[arg(long, value_parser = parse_local_datetime)]
        now: NaiveDateTime,
        /// Call this entry to the call station
        #[arg(long, conflicts_with = "call_next")]
        call: Option<EntryId>,
        /// Call the first waiting entry
        #[arg(long)]
        call_next: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::EndTime { start, duration } => {
            let duration = duration.unwrap_or(config.default_duration_minutes);
            let end = end_time(start, duration)
                .with_context(|| format!("Cannot compute end of {} + {} min", start, duration))?;
            print_json(&json!({ "start": start, "duration": duration, "end": end }))?;
        }
        Commands::Conflict {
            input,
            practitioner,
            date,
            start,
            duration,
            exclude,
        } => {
            let bookings = read_bookings(input.as_deref())?;
            let mut slot = ProposedSlot::new(
                practitioner,
                date,
                start,
                duration.unwrap_or(config.default_duration_minutes),
            );
            if let Some(id) = exclude {
                slot = slot.editing(id);
            }
            let proposed = slot.interval().context("Invalid proposed slot")?;
            let blocking = first_conflict(
                &bookings,
                slot.practitioner_id,
                slot.date,
                proposed,
                slot.editing,
            );
            info!(
                practitioner = slot.practitioner_id,
                date = %slot.date,
                slot = %proposed,
                conflict = blocking.is_some(),
                "conflict check"
            );
            print_json(&json!({
                "conflict": blocking.is_some(),
                "start": proposed.start(),
                "end": proposed.end(),
                "blocking": blocking.map(|b| b.id),
            }))?;
        }
        Commands::Slots {
            input,
            practitioner,
            date,
            duration,
        } => {
            let bookings = read_bookings(input.as_deref())?;
            let duration = duration.unwrap_or(config.default_duration_minutes);
            let free = available_starts(&bookings, practitioner, date, duration, &config.start_times);
            print_json(&free)?;
        }
        Commands::Audit { input } => {
            let bookings = read_bookings(input.as_deref())?;
            print_json(&find_conflicts(&bookings))?;
        }
        Commands::Queue {
            input,
            now,
            call,
            call_next,
        } => {
            let raw = read_input(input.as_deref())?;
            let entries: Vec<WaitingEntry> =
                serde_json::from_str(&raw).context("Failed to parse waiting entries JSON")?;
            let mut room = WaitingRoom::new(entries, now).context("Invalid waiting room")?;

            if let Some(id) = call {
                room.call(id).with_context(|| format!("Cannot call entry {}", id))?;
            } else if call_next {
                room.call_next().context("Cannot call next entry")?;
            }

            print_json(&QueueReport::new(&room, &config))?;
        }
        Commands::Config => {
            print_json(&config)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueReport<'a> {
    entries: Vec<QueueLine<'a>>,
    stats: rdv_engine::QueueStats,
    tick_seconds: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueLine<'a> {
    #[serde(flatten)]
    entry: &'a WaitingEntry,
    elapsed_minutes: i64,
}

impl<'a> QueueReport<'a> {
    fn new(room: &'a WaitingRoom, config: &EngineConfig) -> Self {
        Self {
            entries: room
                .entries()
                .iter()
                .map(|entry| QueueLine {
                    entry,
                    elapsed_minutes: room.elapsed_minutes(entry),
                })
                .collect(),
            stats: room.stats(),
            tick_seconds: config.tick_seconds,
        }
    }
}

fn read_bookings(path: Option<&str>) -> Result<Vec<Booking>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse bookings JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", pretty);
    Ok(())
}
