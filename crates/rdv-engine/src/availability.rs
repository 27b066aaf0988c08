//! Day schedules and free time for one practitioner.
//!
//! Busy periods are the non-cancelled bookings of the practitioner on the
//! given date. They are merged before gaps are computed, so overlapping
//! double-bookings never produce negative or duplicated free time.

use chrono::NaiveDate;
use serde::Serialize;

use crate::booking::{Booking, PractitionerId};
use crate::conflict::has_conflict;
use crate::time::{Interval, TimeOfDay};

/// Start times offered by the booking form: mornings 08:00-11:30 and
/// afternoons 14:00-17:30, every half hour.
pub const DEFAULT_START_TIMES: [TimeOfDay; 16] = [
    TimeOfDay::hm(8, 0),
    TimeOfDay::hm(8, 30),
    TimeOfDay::hm(9, 0),
    TimeOfDay::hm(9, 30),
    TimeOfDay::hm(10, 0),
    TimeOfDay::hm(10, 30),
    TimeOfDay::hm(11, 0),
    TimeOfDay::hm(11, 30),
    TimeOfDay::hm(14, 0),
    TimeOfDay::hm(14, 30),
    TimeOfDay::hm(15, 0),
    TimeOfDay::hm(15, 30),
    TimeOfDay::hm(16, 0),
    TimeOfDay::hm(16, 30),
    TimeOfDay::hm(17, 0),
    TimeOfDay::hm(17, 30),
];

/// A free gap in a practitioner's day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeSlot {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub duration_minutes: u32,
}

/// Active bookings for the practitioner on `date`, sorted by start then id.
pub fn day_schedule(
    bookings: &[Booking],
    practitioner_id: PractitionerId,
    date: NaiveDate,
) -> Vec<&Booking> {
    let mut day: Vec<&Booking> = bookings
        .iter()
        .filter(|b| {
            b.practitioner_id == practitioner_id && b.date == date && b.status().blocks_slot()
        })
        .collect();
    day.sort_by_key(|b| (b.start(), b.id));
    day
}

/// Candidate start times at which a `duration_minutes` appointment fits.
///
/// Candidates whose derived end would pass midnight are skipped, as are
/// candidates that overlap an active booking. Output keeps candidate order.
pub fn available_starts(
    bookings: &[Booking],
    practitioner_id: PractitionerId,
    date: NaiveDate,
    duration_minutes: u32,
    candidates: &[TimeOfDay],
) -> Vec<TimeOfDay> {
    candidates
        .iter()
        .copied()
        .filter(|&start| match Interval::from_duration(start, duration_minutes) {
            Ok(slot) => !has_conflict(bookings, practitioner_id, date, slot, None),
            Err(_) => false,
        })
        .collect()
}

/// Merge the practitioner's busy intervals, clipped to `window`.
///
/// Returns a sorted, non-overlapping list of (start, end) pairs. Adjacent
/// bookings are merged into one busy block.
fn merge_busy_periods(
    bookings: &[Booking],
    practitioner_id: PractitionerId,
    date: NaiveDate,
    window: Interval,
) -> Vec<(TimeOfDay, TimeOfDay)> {
    let mut merged: Vec<(TimeOfDay, TimeOfDay)> = Vec::new();

    // day_schedule is already sorted by start.
    for booking in day_schedule(bookings, practitioner_id, date) {
        let slot = booking.interval();
        if !slot.overlaps(&window) {
            continue;
        }
        let start = slot.start().max(window.start());
        let end = slot.end().min(window.end());

        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Free gaps inside `window` for the practitioner on `date`, sorted by start.
pub fn free_slots(
    bookings: &[Booking],
    practitioner_id: PractitionerId,
    date: NaiveDate,
    window: Interval,
) -> Vec<FreeSlot> {
    let mut slots = Vec::new();
    let mut cursor = window.start();

    for (busy_start, busy_end) in merge_busy_periods(bookings, practitioner_id, date, window) {
        if cursor < busy_start {
            slots.push(gap(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }

    if cursor < window.end() {
        slots.push(gap(cursor, window.end()));
    }

    slots
}

fn gap(start: TimeOfDay, end: TimeOfDay) -> FreeSlot {
    FreeSlot {
        start,
        end,
        duration_minutes: u32::from(end.minutes() - start.minutes()),
    }
}
