//! Booking records and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{BookingId, GroupId, UserId, VehicleId};
use crate::ownership::OwnershipShare;
use crate::slot::TimeSlot;

/// Lifecycle state of a booking.
///
/// `Booked` is the only active state. The two terminal states are never left
/// again; an edit produces a fresh `Booked` record instead of reviving one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// The booking holds its slot.
    Booked,
    /// A higher-share owner took the slot.
    Overridden,
    /// The holder canceled or replaced the booking.
    Canceled,
}

impl BookingStatus {
    /// Whether the booking has permanently left the active state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Overridden | Self::Canceled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Booked => "booked",
            Self::Overridden => "overridden",
            Self::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

/// A reservation of one vehicle for one time slot.
///
/// The holder's ownership share is snapshotted at creation time, so later
/// membership changes never reshuffle the priority of bookings already made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique, time-ordered identifier.
    pub id: BookingId,
    /// The vehicle being reserved.
    pub vehicle_id: VehicleId,
    /// The co-ownership group the vehicle belongs to.
    pub group_id: GroupId,
    /// The member holding the reservation.
    pub user_id: UserId,
    /// The reserved interval.
    pub slot: TimeSlot,
    /// The holder's share of the vehicle at booking time.
    pub ownership_snapshot: OwnershipShare,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking last changed state.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new active booking with a fresh time-ordered id.
    #[must_use]
    pub fn new(
        vehicle_id: VehicleId,
        group_id: GroupId,
        user_id: UserId,
        slot: TimeSlot,
        ownership_snapshot: OwnershipShare,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BookingId::generate(),
            vehicle_id,
            group_id,
            user_id,
            slot,
            ownership_snapshot,
            status: BookingStatus::Booked,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the booking still holds its slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Booked)
    }

    /// Mark the booking overridden by a higher-share owner.
    ///
    /// Returns `false` if the booking was already terminal; terminal rows are
    /// never restated.
    pub fn supersede(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = BookingStatus::Overridden;
        self.updated_at = Utc::now();
        true
    }

    /// Mark the booking canceled by its holder.
    ///
    /// Returns `false` if the booking was already terminal.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = BookingStatus::Canceled;
        self.updated_at = Utc::now();
        true
    }
}
