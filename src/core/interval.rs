//! Time representation and validated playback intervals.
//!
//! Time is seconds as f64, matching the scalar the playback source emits on
//! every tick. An [`Interval`] is the `[start, end]` range of one annotation;
//! containment is closed on both ends, so an annotation is active at exactly
//! `t == end`.

use std::fmt;

/// Time in seconds since timeline start.
pub type Time = f64;

/// Error type for interval construction.
///
/// A malformed interval indicates a corrupt upstream data model and is
/// rejected at the call that introduced it, never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum IntervalError {
    #[error("interval start {start} must not be negative")]
    NegativeStart { start: Time },
    #[error("interval end {end} lies before start {start}")]
    Reversed { start: Time, end: Time },
}

/// Immutable `[start, end]` range on the timeline.
///
/// Invariant: `0 <= start <= end`. Zero-length intervals are valid and are
/// active at exactly one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    start: Time,
    end: Time,
}

impl Interval {
    /// Create a validated interval.
    pub fn new(start: Time, end: Time) -> Result<Self, IntervalError> {
        if start < 0.0 || start.is_nan() {
            return Err(IntervalError::NegativeStart { start });
        }
        if end < start || end.is_nan() {
            return Err(IntervalError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    /// Temporal midpoint, the anchor a tile is laid out around.
    pub fn midpoint(&self) -> Time {
        self.start + (self.end - self.start) / 2.0
    }

    /// Closed containment test: `start <= t <= end`.
    pub fn contains(&self, t: Time) -> bool {
        self.start <= t && t <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
