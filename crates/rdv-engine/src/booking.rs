//! Booking records, their status lifecycle, and proposed slots.
//!
//! A booking's interval is validated on construction and on deserialization,
//! so every `Booking` in memory satisfies `start < end`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RdvError, Result};
use crate::time::{Interval, TimeOfDay};

pub type BookingId = u64;
pub type PatientId = u64;
pub type PractitionerId = u64;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum BookingStatus {
    #[default]
    #[serde(rename = "planifie")]
    Planned,
    #[serde(rename = "confirme")]
    Confirmed,
    #[serde(rename = "annule")]
    Cancelled,
    #[serde(rename = "termine")]
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Planned => "planifie",
            BookingStatus::Confirmed => "confirme",
            BookingStatus::Cancelled => "annule",
            BookingStatus::Completed => "termine",
        }
    }

    /// Cancelled and completed bookings accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Whether a booking in this status occupies its slot.
    pub fn blocks_slot(self) -> bool {
        self != BookingStatus::Cancelled
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = RdvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planifie" => Ok(BookingStatus::Planned),
            "confirme" => Ok(BookingStatus::Confirmed),
            "annule" => Ok(BookingStatus::Cancelled),
            "termine" => Ok(BookingStatus::Completed),
            other => Err(RdvError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = RdvError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// An existing appointment for one practitioner on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookingRecord", into = "BookingRecord")]
pub struct Booking {
    pub id: BookingId,
    pub patient_id: PatientId,
    pub practitioner_id: PractitionerId,
    pub date: NaiveDate,
    slot: Interval,
    status: BookingStatus,
    pub consultation_type: Option<String>,
    pub reason: Option<String>,
}

/// Wire shape of a booking: flat `start`/`end` strings, unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRecord {
    id: BookingId,
    #[serde(default)]
    patient_id: PatientId,
    practitioner_id: PractitionerId,
    date: NaiveDate,
    start: TimeOfDay,
    end: TimeOfDay,
    #[serde(default)]
    status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    consultation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = RdvError;

    fn try_from(r: BookingRecord) -> Result<Self> {
        let mut booking = Booking::new(r.id, r.patient_id, r.practitioner_id, r.date, r.start, r.end)?
            .with_status(r.status);
        booking.consultation_type = r.consultation_type;
        booking.reason = r.reason;
        Ok(booking)
    }
}

impl From<Booking> for BookingRecord {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            patient_id: b.patient_id,
            practitioner_id: b.practitioner_id,
            date: b.date,
            start: b.slot.start(),
            end: b.slot.end(),
            status: b.status,
            consultation_type: b.consultation_type,
            reason: b.reason,
        }
    }
}

impl Booking {
    /// Create a planned booking. Fails with `InvalidInterval` unless `start < end`.
    pub fn new(
        id: BookingId,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Self> {
        Ok(Self {
            id,
            patient_id,
            practitioner_id,
            date,
            slot: Interval::new(start, end)?,
            status: BookingStatus::Planned,
            consultation_type: None,
            reason: None,
        })
    }

    /// Set the initial status, e.g. when loading history.
    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn interval(&self) -> Interval {
        self.slot
    }

    pub fn start(&self) -> TimeOfDay {
        self.slot.start()
    }

    pub fn end(&self) -> TimeOfDay {
        self.slot.end()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.slot.duration_minutes()
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// planifie → confirme
    pub fn confirm(&mut self) -> Result<()> {
        self.transition(BookingStatus::Confirmed, &[BookingStatus::Planned])
    }

    /// planifie | confirme → annule
    pub fn cancel(&mut self) -> Result<()> {
        self.transition(
            BookingStatus::Cancelled,
            &[BookingStatus::Planned, BookingStatus::Confirmed],
        )
    }

    /// planifie | confirme → termine
    pub fn complete(&mut self) -> Result<()> {
        self.transition(
            BookingStatus::Completed,
            &[BookingStatus::Planned, BookingStatus::Confirmed],
        )
    }

    fn transition(&mut self, to: BookingStatus, allowed_from: &[BookingStatus]) -> Result<()> {
        if !allowed_from.contains(&self.status) {
            warn!(booking = self.id, from = %self.status, to = %to, "rejected booking transition");
            return Err(RdvError::InvalidBookingTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// A booking being drafted or edited, before it is persisted.
///
/// Only the start and duration are taken from the caller; the end is always
/// derived so it can never drift from the duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedSlot {
    pub practitioner_id: PractitionerId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub duration_minutes: u32,
    /// The booking being edited in place, excluded from its own conflict check.
    #[serde(default)]
    pub editing: Option<BookingId>,
}

impl ProposedSlot {
    pub fn new(
        practitioner_id: PractitionerId,
        date: NaiveDate,
        start: TimeOfDay,
        duration_minutes: u32,
    ) -> Self {
        Self {
            practitioner_id,
            date,
            start,
            duration_minutes,
            editing: None,
        }
    }

    /// Mark this slot as an edit of an existing booking.
    pub fn editing(mut self, id: BookingId) -> Self {
        self.editing = Some(id);
        self
    }

    /// The derived `[start, start + duration)` interval.
    pub fn interval(&self) -> Result<Interval> {
        Interval::from_duration(self.start, self.duration_minutes)
    }
}
