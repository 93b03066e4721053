//! Error types for covolt.

use crate::booking::BookingStatus;

/// Result type for covolt reservation operations.
pub type Result<T> = std::result::Result<T, ReservationError>;

/// Errors that can occur in covolt reservation operations.
///
/// Every variant maps to a stable machine-readable code via
/// [`ReservationError::code`], which the HTTP layer puts in error envelopes
/// so clients can branch without parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    /// The requested time slot is empty or reversed.
    #[error("invalid interval: start must be strictly before end")]
    InvalidInterval,

    /// The requested time slot starts in the past.
    #[error("booking start is in the past")]
    StartInPast,

    /// The vehicle does not belong to the named group.
    #[error("vehicle does not belong to the group")]
    VehicleNotInGroup,

    /// An ownership share was out of range or malformed.
    #[error("invalid ownership share: {0}")]
    InvalidShare(String),

    /// The requester holds no ownership share for the vehicle.
    #[error("requester is not a member of the group for this vehicle")]
    NotAMember,

    /// The booking would exceed the per-month distinct booking day cap.
    #[error("day quota exceeded: booking would span {days} distinct days this month, limit is {max}")]
    DayQuotaExceeded {
        /// Distinct booked days the request would reach.
        days: u32,
        /// Configured maximum distinct days per month.
        max: u32,
    },

    /// The requester already holds an active booking overlapping the slot.
    #[error("requester already holds an overlapping booking")]
    SelfConflict,

    /// An overlapping booking belongs to an owner with a higher share.
    #[error("an overlapping booking belongs to a higher-share owner")]
    LowerOwnership,

    /// An overlapping booking belongs to an owner with an equal share.
    #[error("an overlapping booking belongs to an equal-share owner; the earlier booking keeps the slot")]
    EqualOwnership,

    /// The requester has no override budget left this month.
    #[error("override limit exceeded: {used} of {max} overrides used this month")]
    OverrideLimitExceeded {
        /// Overrides already consumed in the current month.
        used: u32,
        /// Configured maximum overrides per month.
        max: u32,
    },

    /// Booking not found.
    #[error("booking not found")]
    NotFound,

    /// The booking belongs to a different user.
    #[error("booking belongs to another user")]
    Forbidden,

    /// The booking is already in a terminal state.
    #[error("booking is already {status}")]
    AlreadyTerminal {
        /// The terminal status the booking is in.
        status: BookingStatus,
    },

    /// A per-resource lock could not be acquired in time.
    #[error("timed out waiting for the {scope} lock")]
    LockTimeout {
        /// Which lock timed out (`vehicle` or `quota`).
        scope: &'static str,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// The group membership service failed or returned garbage.
    #[error("group service error: {0}")]
    Directory(String),
}

impl ReservationError {
    /// Stable machine-readable error code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInterval => "invalid_interval",
            Self::StartInPast => "start_in_past",
            Self::VehicleNotInGroup => "vehicle_not_in_group",
            Self::InvalidShare(_) => "invalid_share",
            Self::NotAMember => "not_a_member",
            Self::DayQuotaExceeded { .. } => "day_quota_exceeded",
            Self::SelfConflict => "self_conflict",
            Self::LowerOwnership => "lower_ownership_conflict",
            Self::EqualOwnership => "equal_ownership_conflict",
            Self::OverrideLimitExceeded { .. } => "override_limit_exceeded",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::AlreadyTerminal { .. } => "already_terminal",
            Self::LockTimeout { .. } => "concurrency_timeout",
            Self::Storage(_) => "storage_error",
            Self::Directory(_) => "group_service_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ReservationError::InvalidInterval.code(), "invalid_interval");
        assert_eq!(
            ReservationError::OverrideLimitExceeded { used: 3, max: 3 }.code(),
            "override_limit_exceeded"
        );
        assert_eq!(
            ReservationError::LockTimeout { scope: "vehicle" }.code(),
            "concurrency_timeout"
        );
        assert_eq!(
            ReservationError::LowerOwnership.code(),
            "lower_ownership_conflict"
        );
    }

    #[test]
    fn already_terminal_names_the_status() {
        let err = ReservationError::AlreadyTerminal {
            status: BookingStatus::Canceled,
        };
        assert_eq!(err.to_string(), "booking is already canceled");
    }
}
