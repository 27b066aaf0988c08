//! # rdv-engine
//!
//! Appointment conflict detection and waiting-room priority scheduling for a
//! clinic front end.
//!
//! Both halves are synchronous and deterministic over caller-owned data: no
//! I/O, no timers, no state kept between calls beyond what a [`WaitingRoom`]
//! holds for its owner.
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` times of day, end-time derivation, half-open intervals
//! - [`booking`] — Booking records, status lifecycle, proposed slots
//! - [`conflict`] — Overlap checks against a practitioner's day
//! - [`availability`] — Day schedule, free start times, free gaps
//! - [`waiting`] — Waiting-room entries and their vocabularies
//! - [`queue`] — Priority ordering, call station, queue statistics
//! - [`filter`] — List filters for bookings and entries
//! - [`config`] — Host tunables
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod config;
pub mod conflict;
pub mod error;
pub mod filter;
pub mod queue;
pub mod time;
pub mod waiting;

pub use availability::{available_starts, day_schedule, free_slots, FreeSlot, DEFAULT_START_TIMES};
pub use booking::{Booking, BookingId, BookingStatus, PatientId, PractitionerId, ProposedSlot};
pub use config::EngineConfig;
pub use conflict::{check_slot, find_conflicts, first_conflict, has_conflict, Conflict};
pub use error::RdvError;
pub use filter::{BookingFilter, QueueFilter};
pub use queue::{compare, reorder, reordered, QueueStats, WaitingRoom};
pub use time::{end_time, Interval, TimeOfDay};
pub use waiting::{wait_progress_percent, CallState, EntryId, Role, Urgency, WaitingEntry};
