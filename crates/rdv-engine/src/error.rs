//! Error types for rdv-engine operations.

use thiserror::Error;

use crate::booking::{BookingId, BookingStatus};
use crate::waiting::{CallState, EntryId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdvError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: String, end: String },

    #[error("Appointment starting at {start} for {duration_minutes} min crosses midnight")]
    CrossesMidnight { start: String, duration_minutes: u32 },

    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),

    #[error("Unknown urgency level: {0}")]
    UnknownUrgency(String),

    #[error("Unknown patient role: {0}")]
    UnknownRole(String),

    #[error("Unknown call state: {0}")]
    UnknownCallState(String),

    #[error("Booking {id} cannot move from {from} to {to}")]
    InvalidBookingTransition {
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Waiting entry {id} cannot move from {from} to {to}")]
    InvalidCallTransition {
        id: EntryId,
        from: CallState,
        to: CallState,
    },

    #[error("Waiting entry {0} not found")]
    EntryNotFound(EntryId),

    #[error("Waiting entry {0} appears more than once")]
    DuplicateEntry(EntryId),

    #[error("Entries {0} and {1} are both called; at most one may be")]
    MultipleCalled(EntryId, EntryId),

    #[error("Waiting entry {0} is already in consultation")]
    InactiveEntry(EntryId),

    #[error("Waiting entry {id} arrives at {arrival}, after now ({now})")]
    FutureArrival {
        id: EntryId,
        arrival: String,
        now: String,
    },

    #[error("Clock went backwards: {now} is before the last tick {last}")]
    ClockWentBackwards { now: String, last: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RdvError>;
