//! Waiting-room priority ordering with a single call station.
//!
//! Entries are ordered by a fixed sequence of tie-break comparators, the
//! first non-equal one deciding:
//!
//! 1. call state: the called entry first
//! 2. confirmation: booked in advance before walk-ins
//! 3. urgency: critique > élevée > moyenne > faible
//! 4. role: urgence > prioritaire > normal
//! 5. elapsed wait in whole minutes, longest first
//!
//! The sort is stable, so entries tied on all five keep their input order and
//! reordering an already ordered queue at the same instant changes nothing.
//!
//! Nothing here owns a timer. The host calls [`WaitingRoom::tick`] from
//! whatever clock it has.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RdvError, Result};
use crate::filter::QueueFilter;
use crate::waiting::{CallState, EntryId, WaitingEntry};

/// Whole minutes since arrival. Callers validate `arrival <= now` first.
fn waited(entry: &WaitingEntry, now: NaiveDateTime) -> i64 {
    (now - entry.arrival).num_minutes()
}

/// Queue order of `a` relative to `b` at `now`; `Less` means `a` is seen first.
pub fn compare(a: &WaitingEntry, b: &WaitingEntry, now: NaiveDateTime) -> Ordering {
    let called = |e: &WaitingEntry| e.state == CallState::Called;

    called(b)
        .cmp(&called(a))
        .then_with(|| b.confirmed.cmp(&a.confirmed))
        .then_with(|| b.urgency.rank().cmp(&a.urgency.rank()))
        .then_with(|| b.role.rank().cmp(&a.role.rank()))
        .then_with(|| waited(b, now).cmp(&waited(a, now)))
}

fn validate_arrivals(entries: &[WaitingEntry], now: NaiveDateTime) -> Result<()> {
    entries
        .iter()
        .try_for_each(|e| e.elapsed_minutes(now).map(|_| ()))
}

/// Sort `entries` in place into queue order at `now`.
///
/// Every entry is validated before anything moves, so on error the slice is
/// untouched.
///
/// # Errors
/// Returns `FutureArrival` if any entry arrives after `now`.
pub fn reorder(entries: &mut [WaitingEntry], now: NaiveDateTime) -> Result<()> {
    validate_arrivals(entries, now)?;
    entries.sort_by(|a, b| compare(a, b, now));
    debug!(entries = entries.len(), %now, "waiting queue reordered");
    Ok(())
}

/// Sorted copy of `entries`; the input is left as it was.
pub fn reordered(entries: &[WaitingEntry], now: NaiveDateTime) -> Result<Vec<WaitingEntry>> {
    let mut copy = entries.to_vec();
    reorder(&mut copy, now)?;
    Ok(copy)
}

/// Reductions over the current queue, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub waiting_count: usize,
    pub called_count: usize,
    /// Mean wait of `en-attente` entries, rounded to the nearest minute; 0 when empty.
    pub mean_wait_minutes: i64,
    /// First entry in queue order, called or not.
    pub head: Option<EntryId>,
    /// First entry still waiting to be called.
    pub next_waiting: Option<EntryId>,
    /// The entry currently at the call station.
    pub current: Option<EntryId>,
}

/// The active set of one waiting room, kept in queue order.
///
/// Entries leave the set when their consultation starts or when the patient
/// leaves. At most one entry is `appelé` at any time.
#[derive(Debug, Clone)]
pub struct WaitingRoom {
    entries: Vec<WaitingEntry>,
    now: NaiveDateTime,
}

impl WaitingRoom {
    /// Build a room from checked-in entries, ordered at `now`.
    ///
    /// # Errors
    /// - `DuplicateEntry` if an id repeats
    /// - `InactiveEntry` for an entry already in consultation
    /// - `MultipleCalled` if more than one entry is called
    /// - `FutureArrival` if an entry arrives after `now`
    pub fn new(mut entries: Vec<WaitingEntry>, now: NaiveDateTime) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut called: Option<EntryId> = None;
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(RdvError::DuplicateEntry(entry.id));
            }
            match entry.state {
                CallState::Waiting => {}
                CallState::Called => {
                    if let Some(first) = called {
                        return Err(RdvError::MultipleCalled(first, entry.id));
                    }
                    called = Some(entry.id);
                }
                CallState::InConsultation => return Err(RdvError::InactiveEntry(entry.id)),
            }
        }
        reorder(&mut entries, now)?;
        Ok(Self { entries, now })
    }

    /// Entries in queue order.
    pub fn entries(&self) -> &[WaitingEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<WaitingEntry> {
        self.entries
    }

    /// Instant of the last ordering.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&WaitingEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Minutes waited by an entry at the last tick.
    pub fn elapsed_minutes(&self, entry: &WaitingEntry) -> i64 {
        waited(entry, self.now)
    }

    pub fn head(&self) -> Option<&WaitingEntry> {
        self.entries.first()
    }

    /// The entry at the call station, if any.
    pub fn current(&self) -> Option<&WaitingEntry> {
        self.entries.iter().find(|e| e.state == CallState::Called)
    }

    /// Recompute waits at `now` and reorder.
    ///
    /// # Errors
    /// Returns `ClockWentBackwards` if `now` precedes the previous tick.
    pub fn tick(&mut self, now: NaiveDateTime) -> Result<()> {
        if now < self.now {
            return Err(RdvError::ClockWentBackwards {
                now: now.to_string(),
                last: self.now.to_string(),
            });
        }
        reorder(&mut self.entries, now)?;
        self.now = now;
        Ok(())
    }

    /// Check in a new arrival.
    ///
    /// Check-ins happen between ticks, so an arrival later than the last tick
    /// moves the room's clock forward to the arrival before reordering.
    pub fn admit(&mut self, entry: WaitingEntry) -> Result<()> {
        if self.get(entry.id).is_some() {
            return Err(RdvError::DuplicateEntry(entry.id));
        }
        if entry.state != CallState::Waiting {
            return Err(RdvError::InvalidCallTransition {
                id: entry.id,
                from: entry.state,
                to: CallState::Waiting,
            });
        }
        self.now = self.now.max(entry.arrival);
        self.entries.push(entry);
        self.resort();
        Ok(())
    }

    /// Send `id` to the call station.
    ///
    /// Whoever was called before goes back to `en-attente` and keeps the
    /// priority they had earned. Calling the entry already at the station is
    /// a no-op.
    pub fn call(&mut self, id: EntryId) -> Result<()> {
        let target = self.index_of(id)?;
        match self.entries[target].state {
            CallState::Called => return Ok(()),
            CallState::Waiting => {}
            from @ CallState::InConsultation => {
                warn!(entry = id, from = %from, "rejected call");
                return Err(RdvError::InvalidCallTransition {
                    id,
                    from,
                    to: CallState::Called,
                });
            }
        }

        let mut recalled = None;
        for entry in self.entries.iter_mut() {
            if entry.state == CallState::Called {
                entry.state = CallState::Waiting;
                recalled = Some(entry.id);
            }
        }
        self.entries[target].state = CallState::Called;
        debug!(called = id, recalled = ?recalled, "call station swap");

        self.resort();
        Ok(())
    }

    /// Call the first waiting entry in queue order. Returns its id, or `None`
    /// when nobody is waiting.
    pub fn call_next(&mut self) -> Result<Option<EntryId>> {
        let next = self
            .entries
            .iter()
            .find(|e| e.state == CallState::Waiting)
            .map(|e| e.id);
        if let Some(id) = next {
            self.call(id)?;
        }
        Ok(next)
    }

    /// Start the consultation of the called entry and remove it from the room.
    ///
    /// # Errors
    /// Returns `InvalidCallTransition` unless the entry is currently called.
    pub fn start_consultation(&mut self, id: EntryId) -> Result<WaitingEntry> {
        let index = self.index_of(id)?;
        let from = self.entries[index].state;
        if from != CallState::Called {
            warn!(entry = id, from = %from, "rejected consultation start");
            return Err(RdvError::InvalidCallTransition {
                id,
                from,
                to: CallState::InConsultation,
            });
        }
        let mut entry = self.entries.remove(index);
        entry.state = CallState::InConsultation;
        Ok(entry)
    }

    /// Remove an entry whose patient left the room.
    pub fn remove(&mut self, id: EntryId) -> Result<WaitingEntry> {
        let index = self.index_of(id)?;
        Ok(self.entries.remove(index))
    }

    pub fn stats(&self) -> QueueStats {
        let waiting: Vec<&WaitingEntry> = self
            .entries
            .iter()
            .filter(|e| e.state == CallState::Waiting)
            .collect();

        let mean_wait_minutes = if waiting.is_empty() {
            0
        } else {
            let total: i64 = waiting.iter().map(|e| waited(e, self.now)).sum();
            let count = waiting.len() as i64;
            // Round half up; waits are never negative.
            (2 * total + count) / (2 * count)
        };

        QueueStats {
            waiting_count: waiting.len(),
            called_count: self.entries.len() - waiting.len(),
            mean_wait_minutes,
            head: self.head().map(|e| e.id),
            next_waiting: waiting.first().map(|e| e.id),
            current: self.current().map(|e| e.id),
        }
    }

    /// Entries matching `filter`, in queue order.
    pub fn filtered(&self, filter: &QueueFilter) -> Vec<&WaitingEntry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    fn index_of(&self, id: EntryId) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(RdvError::EntryNotFound(id))
    }

    fn resort(&mut self) {
        let now = self.now;
        self.entries.sort_by(|a, b| compare(a, b, now));
    }
}
