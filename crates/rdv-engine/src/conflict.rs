//! Detect overlapping bookings for a practitioner.
//!
//! Only bookings of the same practitioner on the same date that still occupy
//! their slot (anything but cancelled) take part. Adjacent bookings, where one
//! ends exactly when another starts, are NOT conflicts.
//!
//! The check is advisory: it reserves nothing, so the caller must re-run it
//! after every change to practitioner, date, start or duration, and the
//! persistence layer must re-validate at commit.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::booking::{Booking, BookingId, PractitionerId, ProposedSlot};
use crate::error::Result;
use crate::time::Interval;

/// Two persisted bookings that occupy overlapping time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub booking_a: BookingId,
    pub booking_b: BookingId,
    pub practitioner_id: PractitionerId,
    pub date: NaiveDate,
    pub overlap_minutes: u32,
}

fn competes(
    booking: &Booking,
    practitioner_id: PractitionerId,
    date: NaiveDate,
    exclude: Option<BookingId>,
) -> bool {
    booking.practitioner_id == practitioner_id
        && booking.date == date
        && booking.status().blocks_slot()
        && exclude != Some(booking.id)
}

/// The first existing booking that blocks `proposed`, if any.
///
/// `exclude` names the booking being edited in place so it does not collide
/// with its own previous slot.
pub fn first_conflict<'a>(
    bookings: &'a [Booking],
    practitioner_id: PractitionerId,
    date: NaiveDate,
    proposed: Interval,
    exclude: Option<BookingId>,
) -> Option<&'a Booking> {
    let found = bookings
        .iter()
        .filter(|b| competes(b, practitioner_id, date, exclude))
        .find(|b| b.interval().overlaps(&proposed));

    if let Some(b) = found {
        debug!(
            practitioner = practitioner_id,
            %date,
            proposed = %proposed,
            blocking = b.id,
            "slot conflict"
        );
    }
    found
}

/// Whether `proposed` overlaps any active booking of the practitioner that day.
///
/// Returns on the first overlap found.
pub fn has_conflict(
    bookings: &[Booking],
    practitioner_id: PractitionerId,
    date: NaiveDate,
    proposed: Interval,
    exclude: Option<BookingId>,
) -> bool {
    first_conflict(bookings, practitioner_id, date, proposed, exclude).is_some()
}

/// Derive the interval of a proposed slot and check it for conflicts.
///
/// # Errors
/// Returns `InvalidInterval` for a zero duration and `CrossesMidnight` when
/// the derived end passes `24:00`. No overlap test runs in either case.
pub fn check_slot(bookings: &[Booking], slot: &ProposedSlot) -> Result<bool> {
    let proposed = slot.interval()?;
    Ok(has_conflict(
        bookings,
        slot.practitioner_id,
        slot.date,
        proposed,
        slot.editing,
    ))
}

/// Find every pair of active bookings that already overlap.
///
/// Pairs are grouped by practitioner and date; each pair is reported once,
/// in input order.
pub fn find_conflicts(bookings: &[Booking]) -> Vec<Conflict> {
    let active: Vec<&Booking> = bookings
        .iter()
        .filter(|b| b.status().blocks_slot())
        .collect();

    let mut conflicts = Vec::new();
    for (i, a) in active.iter().enumerate() {
        for b in &active[i + 1..] {
            if a.practitioner_id != b.practitioner_id || a.date != b.date {
                continue;
            }
            let overlap_minutes = a.interval().overlap_minutes(&b.interval());
            if overlap_minutes > 0 {
                conflicts.push(Conflict {
                    booking_a: a.id,
                    booking_b: b.id,
                    practitioner_id: a.practitioner_id,
                    date: a.date,
                    overlap_minutes,
                });
            }
        }
    }

    conflicts
}
