//! Waiting-room entries and their closed vocabularies.
//!
//! Every enum here maps a fixed set of tokens; anything else is rejected
//! with an error instead of being ranked by a fallback.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RdvError, Result};

pub type EntryId = u64;

/// Medical urgency, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Urgency {
    #[serde(rename = "faible")]
    Low,
    #[serde(rename = "moyenne")]
    Medium,
    #[serde(rename = "élevée")]
    High,
    #[serde(rename = "critique")]
    Critical,
}

impl Urgency {
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Low => 1,
            Urgency::Medium => 2,
            Urgency::High => 3,
            Urgency::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "faible",
            Urgency::Medium => "moyenne",
            Urgency::High => "élevée",
            Urgency::Critical => "critique",
        }
    }
}

impl FromStr for Urgency {
    type Err = RdvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "faible" => Ok(Urgency::Low),
            "moyenne" => Ok(Urgency::Medium),
            "élevée" => Ok(Urgency::High),
            "critique" => Ok(Urgency::Critical),
            other => Err(RdvError::UnknownUrgency(other.to_string())),
        }
    }
}

/// Administrative role of the patient, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Role {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "prioritaire")]
    Priority,
    #[serde(rename = "urgence")]
    Emergency,
}

impl Role {
    pub fn rank(self) -> u8 {
        match self {
            Role::Normal => 1,
            Role::Priority => 2,
            Role::Emergency => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Priority => "prioritaire",
            Role::Emergency => "urgence",
        }
    }
}

impl FromStr for Role {
    type Err = RdvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Role::Normal),
            "prioritaire" => Ok(Role::Priority),
            "urgence" => Ok(Role::Emergency),
            other => Err(RdvError::UnknownRole(other.to_string())),
        }
    }
}

/// Position of an entry in the call-station state machine.
///
/// `Waiting → Called → InConsultation`; `Called → Waiting` only when another
/// entry is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum CallState {
    #[default]
    #[serde(rename = "en-attente")]
    Waiting,
    #[serde(rename = "appelé")]
    Called,
    #[serde(rename = "en-consultation")]
    InConsultation,
}

impl CallState {
    pub fn as_str(self) -> &'static str {
        match self {
            CallState::Waiting => "en-attente",
            CallState::Called => "appelé",
            CallState::InConsultation => "en-consultation",
        }
    }
}

impl FromStr for CallState {
    type Err = RdvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en-attente" => Ok(CallState::Waiting),
            "appelé" => Ok(CallState::Called),
            "en-consultation" => Ok(CallState::InConsultation),
            other => Err(RdvError::UnknownCallState(other.to_string())),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = RdvError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }
    )*};
}

string_conversions!(Urgency, Role, CallState);

/// Parse an ISO 8601 datetime into local wall-clock time.
///
/// Accepts RFC 3339 with an offset or `Z` (e.g., "2026-03-16T09:45:00.000Z",
/// as produced by browsers), keeping the wall-clock reading in that offset,
/// and naive local time (e.g., "2026-03-16T09:45:00").
pub fn parse_local_datetime(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.naive_local()),
        Err(_) => s.parse::<NaiveDateTime>(),
    }
}

fn deserialize_local_datetime<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_local_datetime(&raw)
        .map_err(|e| serde::de::Error::custom(format!("Invalid datetime '{}': {}", raw, e)))
}

/// A patient checked in to the waiting room.
///
/// Elapsed wait is never stored: it is always `now - arrival`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingEntry {
    pub id: EntryId,
    /// Local wall-clock check-in time.
    #[serde(deserialize_with = "deserialize_local_datetime")]
    pub arrival: NaiveDateTime,
    pub urgency: Urgency,
    pub role: Role,
    #[serde(default)]
    pub state: CallState,
    /// Booked in advance (true) or walk-in (false).
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl WaitingEntry {
    /// A waiting walk-in with no display data.
    pub fn new(id: EntryId, arrival: NaiveDateTime, urgency: Urgency, role: Role) -> Self {
        Self {
            id,
            arrival,
            urgency,
            role,
            state: CallState::Waiting,
            confirmed: false,
            patient_name: String::new(),
            practitioner: None,
            phone: None,
        }
    }

    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn with_state(mut self, state: CallState) -> Self {
        self.state = state;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.patient_name = name.into();
        self
    }

    /// Whole minutes waited at `now`, rounded down.
    ///
    /// # Errors
    /// Returns `FutureArrival` when `arrival` is after `now`.
    pub fn elapsed_minutes(&self, now: NaiveDateTime) -> Result<i64> {
        if self.arrival > now {
            return Err(RdvError::FutureArrival {
                id: self.id,
                arrival: self.arrival.to_string(),
                now: now.to_string(),
            });
        }
        Ok((now - self.arrival).num_minutes())
    }
}

/// Width of the wait progress bar, saturating at one hour.
pub fn wait_progress_percent(elapsed_minutes: i64) -> f64 {
    let capped = elapsed_minutes.clamp(0, 60);
    capped as f64 / 60.0 * 100.0
}
