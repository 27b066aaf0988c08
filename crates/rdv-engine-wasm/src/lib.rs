//! WASM bindings for rdv-engine.
//!
//! Exposes end-time derivation, conflict checks, free start times, and
//! waiting-room ordering to the browser front end via `wasm-bindgen`. All
//! complex types are passed as JSON strings in the same record shapes the
//! engine deserializes.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p rdv-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/rdv_engine_wasm.wasm
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use rdv_engine::{
    Booking, EntryId, FreeSlot, Interval, PractitionerId, ProposedSlot, QueueStats, TimeOfDay,
    WaitingEntry, WaitingRoom,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueLineDto<'a> {
    #[serde(flatten)]
    entry: &'a WaitingEntry,
    elapsed_minutes: i64,
    progress_percent: f64,
}

#[derive(Serialize)]
struct QueueDto<'a> {
    entries: Vec<QueueLineDto<'a>>,
    stats: QueueStats,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Parse `now` the same way waiting-entry arrivals are parsed, so
/// `new Date().toISOString()` works for both.
fn parse_datetime(s: &str) -> Result<NaiveDateTime, JsValue> {
    rdv_engine::waiting::parse_local_datetime(s)
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    s.parse::<NaiveDate>()
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

fn parse_bookings_json(json: &str) -> Result<Vec<Booking>, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid bookings JSON: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// End time (`"HH:MM"`) of an appointment starting at `start` lasting `duration_minutes`.
#[wasm_bindgen(js_name = "computeEndTime")]
pub fn compute_end_time(start: &str, duration_minutes: u32) -> Result<String, JsValue> {
    let start: TimeOfDay = start.parse().map_err(js_err)?;
    let end = rdv_engine::end_time(start, duration_minutes).map_err(js_err)?;
    Ok(end.to_string())
}

/// Whether a proposed slot overlaps an existing booking.
///
/// `bookings_json` is an array of booking records; `proposed_json` is a
/// `{practitionerId, date, start, durationMinutes, editing?}` object. The end
/// is always derived from start and duration.
#[wasm_bindgen(js_name = "hasConflict")]
pub fn has_conflict(bookings_json: &str, proposed_json: &str) -> Result<bool, JsValue> {
    let bookings = parse_bookings_json(bookings_json)?;
    let slot: ProposedSlot = serde_json::from_str(proposed_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid proposed slot JSON: {}", e)))?;
    rdv_engine::check_slot(&bookings, &slot).map_err(js_err)
}

/// Candidate start times still free for the practitioner on `date`.
///
/// Returns a JSON array of `"HH:MM"` strings, drawn from the default booking
/// form start times. Ids are 64-bit, so `practitioner_id` is a `BigInt` on
/// the JS side.
#[wasm_bindgen(js_name = "availableStarts")]
pub fn available_starts(
    bookings_json: &str,
    practitioner_id: PractitionerId,
    date: &str,
    duration_minutes: u32,
) -> Result<String, JsValue> {
    let bookings = parse_bookings_json(bookings_json)?;
    let date = parse_date(date)?;
    let free = rdv_engine::available_starts(
        &bookings,
        practitioner_id,
        date,
        duration_minutes,
        &rdv_engine::DEFAULT_START_TIMES,
    );
    to_json(&free)
}

/// Free gaps for the practitioner on `date` between `window_start` and `window_end`.
///
/// Returns a JSON array of `{start, end, durationMinutes}` objects.
/// `practitioner_id` is a `BigInt` on the JS side.
#[wasm_bindgen(js_name = "freeSlots")]
pub fn free_slots(
    bookings_json: &str,
    practitioner_id: PractitionerId,
    date: &str,
    window_start: &str,
    window_end: &str,
) -> Result<String, JsValue> {
    let bookings = parse_bookings_json(bookings_json)?;
    let date = parse_date(date)?;
    let start: TimeOfDay = window_start.parse().map_err(js_err)?;
    let end: TimeOfDay = window_end.parse().map_err(js_err)?;
    let window = Interval::new(start, end).map_err(js_err)?;

    let slots: Vec<FreeSlot> = rdv_engine::free_slots(&bookings, practitioner_id, date, window);
    to_json(&slots)
}

/// Pairs of bookings that already overlap.
#[wasm_bindgen(js_name = "findDoubleBookings")]
pub fn find_double_bookings(bookings_json: &str) -> Result<String, JsValue> {
    let bookings = parse_bookings_json(bookings_json)?;
    to_json(&rdv_engine::find_conflicts(&bookings))
}

/// Order a waiting room at `now`, optionally calling an entry first.
///
/// `entries_json` is an array of waiting entries. Returns
/// `{entries: [...], stats: {...}}` where each entry carries its
/// `elapsedMinutes` and `progressPercent` at `now`. `call` is a `BigInt`
/// entry id, or `undefined`.
#[wasm_bindgen(js_name = "reorderQueue")]
pub fn reorder_queue(
    entries_json: &str,
    now: &str,
    call: Option<EntryId>,
) -> Result<String, JsValue> {
    let entries: Vec<WaitingEntry> = serde_json::from_str(entries_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid waiting entries JSON: {}", e)))?;
    let now = parse_datetime(now)?;

    let mut room = WaitingRoom::new(entries, now).map_err(js_err)?;
    if let Some(id) = call {
        room.call(id).map_err(js_err)?;
    }

    let lines = room
        .entries()
        .iter()
        .map(|entry| {
            let elapsed_minutes = room.elapsed_minutes(entry);
            QueueLineDto {
                entry,
                elapsed_minutes,
                progress_percent: rdv_engine::wait_progress_percent(elapsed_minutes),
            }
        })
        .collect();

    to_json(&QueueDto {
        entries: lines,
        stats: room.stats(),
    })
}
