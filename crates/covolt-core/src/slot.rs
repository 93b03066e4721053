//! Time slot type for bookings.
//!
//! A [`TimeSlot`] is a half-open interval `[start, end)` in UTC. The exclusive
//! end bound means back-to-back slots such as 08:00-10:00 and 10:00-12:00 do
//! not overlap, so a handover at the boundary minute needs no special casing.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReservationError;

/// A validated half-open time interval `[start, end)` in UTC.
///
/// Construction guarantees `start < end`; the type has no way to represent an
/// empty or reversed interval. Deserialization runs the same validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotBounds", into = "SlotBounds")]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSlot {
    /// Create a slot from its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidInterval`] unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReservationError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(ReservationError::InvalidInterval)
        }
    }

    /// Inclusive start of the slot.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end of the slot.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the slot.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether two slots share any instant.
    ///
    /// Half-open semantics: slots that merely touch at a boundary do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The UTC calendar dates the slot touches, in order.
    ///
    /// A slot ending exactly at midnight does not touch the end date, matching
    /// the exclusive end bound.
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        let last = if self.end.time() == NaiveTime::MIN {
            self.end.date_naive().pred_opt().unwrap_or(first)
        } else {
            self.end.date_naive()
        };

        let mut out = Vec::new();
        let mut day = first;
        while day <= last {
            out.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        out
    }
}

/// Raw wire shape for [`TimeSlot`]; validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SlotBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<SlotBounds> for TimeSlot {
    type Error = ReservationError;

    fn try_from(bounds: SlotBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl From<TimeSlot> for SlotBounds {
    fn from(slot: TimeSlot) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
        }
    }
}
