//! Wall-clock time-of-day arithmetic and half-open intervals.
//!
//! Times are held as minutes since midnight so that comparisons are plain
//! integer comparisons, never string or locale comparisons. `24:00` is a
//! valid value but only makes sense as the end of an interval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RdvError, Result};

/// Minutes in one calendar day; also the numeric value of `24:00`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A local wall-clock time of day, `00:00` through `24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from hour and minute. `(24, 0)` is accepted as end of day.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(RdvError::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Unchecked constructor for compile-time constants.
    pub(crate) const fn hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(RdvError::InvalidTime(format!("{} minutes", minutes)));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = RdvError;

    /// Parse a strict 24-hour `"HH:MM"` string.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RdvError::InvalidTime(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let hour = u16::from(digits[0] - b'0') * 10 + u16::from(digits[1] - b'0');
        let minute = u16::from(digits[2] - b'0') * 10 + u16::from(digits[3] - b'0');
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = RdvError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Compute the end of an appointment from its start and duration.
///
/// A zero duration is an empty interval and is rejected. A result past
/// `24:00` is rejected as well: appointments never wrap into the next day.
pub fn end_time(start: TimeOfDay, duration_minutes: u32) -> Result<TimeOfDay> {
    if duration_minutes == 0 {
        return Err(RdvError::InvalidInterval {
            start: start.to_string(),
            end: start.to_string(),
        });
    }
    let end = u32::from(start.minutes()) + duration_minutes;
    if end > u32::from(MINUTES_PER_DAY) {
        return Err(RdvError::CrossesMidnight {
            start: start.to_string(),
            duration_minutes,
        });
    }
    // end <= 1440 here, so the narrowing cannot truncate.
    Ok(TimeOfDay(end as u16))
}

/// A half-open `[start, end)` span within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl Interval {
    /// Returns `InvalidInterval` unless `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if end <= start {
            return Err(RdvError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Interval starting at `start` and lasting `duration_minutes`.
    pub fn from_duration(start: TimeOfDay, duration_minutes: u32) -> Result<Self> {
        let end = end_time(start, duration_minutes)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.minutes() - self.start.minutes())
    }

    /// Half-open overlap: `s1 < e2 && e1 > s2`.
    ///
    /// Touching intervals, where one ends exactly when the other starts,
    /// do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Length of the shared span in minutes, 0 when disjoint.
    pub fn overlap_minutes(&self, other: &Interval) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        u32::from(end.minutes() - start.minutes())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
