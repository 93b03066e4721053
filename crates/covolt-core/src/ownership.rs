//! Ownership shares in basis points.
//!
//! Group services usually hand out shares as percentages. Percentages are
//! floats, and float equality is exactly what conflict resolution must not
//! depend on, so shares are converted to integer basis points at the edge
//! and compared as integers everywhere else.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReservationError;
use crate::ids::{GroupId, UserId, VehicleId};

/// Basis points representing 100% ownership.
pub const FULL_OWNERSHIP_BASIS_POINTS: u16 = 10_000;

/// A fractional ownership share, stored in basis points (1% = 100 bp).
///
/// Ranges over `0..=10_000`. Ordering and equality are plain integer
/// comparisons, so two owners with the same percentage always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct OwnershipShare(u16);

impl OwnershipShare {
    /// Create a share from basis points.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidShare`] if the value exceeds
    /// [`FULL_OWNERSHIP_BASIS_POINTS`].
    pub fn from_basis_points(basis_points: u16) -> Result<Self, ReservationError> {
        if basis_points > FULL_OWNERSHIP_BASIS_POINTS {
            return Err(ReservationError::InvalidShare(format!(
                "{basis_points} basis points exceeds full ownership"
            )));
        }
        Ok(Self(basis_points))
    }

    /// Create a share from a percentage, rounding to the nearest basis point.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidShare`] if the percentage is not a
    /// finite value in `0.0..=100.0`.
    pub fn from_percent(percent: f64) -> Result<Self, ReservationError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ReservationError::InvalidShare(format!(
                "percent out of range: {percent}"
            )));
        }
        // The range check above bounds the rounded value at 10_000.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let basis_points = (percent * 100.0).round() as u16;
        Self::from_basis_points(basis_points)
    }

    /// The share in basis points.
    #[must_use]
    pub const fn basis_points(&self) -> u16 {
        self.0
    }

    /// The share as a percentage, for display and API payloads.
    #[must_use]
    pub fn as_percent(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl TryFrom<u16> for OwnershipShare {
    type Error = ReservationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_basis_points(value)
    }
}

impl From<OwnershipShare> for u16 {
    fn from(share: OwnershipShare) -> Self {
        share.0
    }
}

impl fmt::Display for OwnershipShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// A point-in-time statement of one member's share of one vehicle.
///
/// This is what the group directory answers lookups with; the engine copies
/// the share into the booking as a snapshot so later membership changes do
/// not alter the priority of existing bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipFact {
    /// The co-ownership group.
    pub group_id: GroupId,
    /// The owning member.
    pub user_id: UserId,
    /// The vehicle the share applies to.
    pub vehicle_id: VehicleId,
    /// The member's share of the vehicle.
    pub share: OwnershipShare,
}
