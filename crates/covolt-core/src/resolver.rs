//! Ownership-weighted conflict resolution.
//!
//! Given a requested slot and the active bookings overlapping it, decide
//! whether the request is accepted outright, wins by overriding every holder,
//! or loses. The rules:
//!
//! - a member never overrides their own booking, whatever the shares;
//! - a request wins only by holding a strictly larger share than **every**
//!   overlapping holder, and then supersedes all of them at once;
//! - on an exact tie the earlier booking keeps the slot.
//!
//! The resolver is a pure function over snapshots. Callers are responsible
//! for holding the per-vehicle lock so the snapshot cannot go stale between
//! resolution and commit.

use std::cmp::Ordering;

use crate::booking::Booking;
use crate::error::ReservationError;
use crate::ids::{BookingId, UserId};
use crate::ownership::OwnershipShare;

/// Outcome of conflict resolution for a requested slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No active overlap; the booking can be written as-is.
    Accept,
    /// The requester outranks every holder and takes the slot.
    Override {
        /// The active bookings the new booking supersedes.
        supersede: Vec<BookingId>,
    },
    /// The request loses and nothing changes.
    Reject(ConflictReason),
}

/// Why a conflicting request loses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The requester already holds an overlapping booking.
    SelfConflict,
    /// Some overlapping holder has a strictly higher share.
    LowerOwnership,
    /// The highest-share holder ties the requester exactly.
    EqualOwnership,
}

impl From<ConflictReason> for ReservationError {
    fn from(reason: ConflictReason) -> Self {
        match reason {
            ConflictReason::SelfConflict => Self::SelfConflict,
            ConflictReason::LowerOwnership => Self::LowerOwnership,
            ConflictReason::EqualOwnership => Self::EqualOwnership,
        }
    }
}

/// Resolve a requested slot against the active bookings overlapping it.
///
/// `overlapping` must contain only active bookings whose slots intersect the
/// request; the store's overlap query produces exactly that. Snapshots are
/// compared, not live shares, so a membership change after booking never
/// demotes an existing reservation.
#[must_use]
pub fn resolve(requester: &UserId, share: OwnershipShare, overlapping: &[Booking]) -> Decision {
    let Some(highest) = overlapping.iter().map(|b| b.ownership_snapshot).max() else {
        return Decision::Accept;
    };

    if overlapping.iter().any(|b| b.user_id == *requester) {
        return Decision::Reject(ConflictReason::SelfConflict);
    }

    match share.cmp(&highest) {
        Ordering::Greater => Decision::Override {
            supersede: overlapping.iter().map(|b| b.id).collect(),
        },
        Ordering::Equal => Decision::Reject(ConflictReason::EqualOwnership),
        Ordering::Less => Decision::Reject(ConflictReason::LowerOwnership),
    }
}
