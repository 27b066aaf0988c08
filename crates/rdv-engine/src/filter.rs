//! View filters over bookings and waiting-room entries.
//!
//! Every criterion is optional; an empty filter matches everything. Text
//! search is a case-insensitive substring match.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::booking::{Booking, BookingStatus, PractitionerId};
use crate::waiting::{CallState, Urgency, WaitingEntry};

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Normalize a search term: trimmed, lowercased, `None` when blank.
fn search_term(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Filter for the waiting-room list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueueFilter {
    /// Matched against the patient name.
    pub search: Option<String>,
    pub urgency: Option<Urgency>,
    pub state: Option<CallState>,
}

impl QueueFilter {
    pub fn matches(&self, entry: &WaitingEntry) -> bool {
        if let Some(term) = search_term(&self.search) {
            if !contains_ignore_case(&entry.patient_name, &term) {
                return false;
            }
        }
        self.urgency.is_none_or(|u| entry.urgency == u)
            && self.state.is_none_or(|s| entry.state == s)
    }
}

/// Filter for the appointment list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    pub date: Option<NaiveDate>,
    pub practitioner_id: Option<PractitionerId>,
    pub status: Option<BookingStatus>,
    /// Matched against the consultation type and the reason.
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(term) = search_term(&self.search) {
            let hit = [&booking.consultation_type, &booking.reason]
                .into_iter()
                .flatten()
                .any(|text| contains_ignore_case(text, &term));
            if !hit {
                return false;
            }
        }
        self.date.is_none_or(|d| booking.date == d)
            && self.practitioner_id.is_none_or(|p| booking.practitioner_id == p)
            && self.status.is_none_or(|s| booking.status() == s)
    }

    /// Matching bookings, in input order.
    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings.iter().filter(|b| self.matches(b)).collect()
    }
}
