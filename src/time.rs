//! Time handling for scenario data.
//!
//! Scenario time is expressed in seconds (`f64`) relative to the start of the
//! scenario's reference year. Samples stamped with [`STATIC_TIME`] are "always
//! valid" and survive the conventional full flush that starts at `0.0`.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp of samples that are valid at every time.
pub const STATIC_TIME: f64 = -1.0;

/// A half-open `[start, end)` range of scenario seconds used by flush operations.
///
/// An `end` of `f64::MAX` means "no upper bound".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlushRange {
    /// Inclusive lower bound.
    pub start: f64,
    /// Exclusive upper bound.
    pub end: f64,
}

impl FlushRange {
    /// Creates a range `[start, end)`.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Everything from `0.0` on; keeps static (`-1`) samples.
    #[must_use]
    pub const fn all() -> Self {
        Self::new(0.0, f64::MAX)
    }

    /// Everything, static samples included.
    #[must_use]
    pub const fn including_static() -> Self {
        Self::new(STATIC_TIME, f64::MAX)
    }

    /// Returns true if the range has no upper bound.
    #[must_use]
    pub fn is_open_ended(&self) -> bool {
        self.end >= f64::MAX
    }

    /// Returns true if the range covers every non-negative time.
    ///
    /// Slices treat such a range as a full flush.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.start <= 0.0 && self.is_open_ended()
    }

    /// Checks whether `time` falls inside the range.
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

impl Default for FlushRange {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for FlushRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open_ended() {
            write!(f, "[{} → ∞)", self.start)
        } else {
            write!(f, "[{} → {})", self.start, self.end)
        }
    }
}

/// First and last data time of an entity or scenario.
///
/// With no data, `first` is `f64::MAX` and `last` is `-f64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBounds {
    /// Earliest data time.
    pub first: f64,
    /// Latest data time.
    pub last: f64,
}

impl TimeBounds {
    /// Bounds with no data.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            first: f64::MAX,
            last: -f64::MAX,
        }
    }

    /// Returns true if no data contributed to these bounds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Widens the bounds to cover `[first, last]`.
    pub fn include(&mut self, first: f64, last: f64) {
        self.first = self.first.min(first);
        self.last = self.last.max(last);
    }
}

impl Default for TimeBounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// Start of the reference year (January 1, 00:00:00 UTC).
#[must_use]
pub fn scenario_epoch(reference_year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(reference_year, 1, 1, 0, 0, 0).single()
}

/// Converts scenario seconds to a UTC timestamp.
///
/// Returns `None` for years chrono cannot represent or non-finite seconds.
#[must_use]
pub fn to_utc(seconds: f64, reference_year: i32) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let epoch = scenario_epoch(reference_year)?;
    #[allow(clippy::cast_possible_truncation)]
    let micros = (seconds * 1_000_000.0).round() as i64;
    epoch.checked_add_signed(Duration::microseconds(micros))
}
