//! Tunable reservation limits.

use serde::{Deserialize, Serialize};

/// Default monthly override budget per member per group.
pub const DEFAULT_MAX_OVERRIDES_PER_MONTH: u32 = 3;

/// Default cap on distinct booked days per member per group per month.
pub const DEFAULT_MAX_BOOKING_DAYS_PER_MONTH: u32 = 3;

/// Limits the reservation engine applies when accepting bookings.
///
/// Both caps are per member per group and reset with the calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPolicy {
    /// Monthly override budget.
    pub max_overrides_per_month: u32,
    /// Cap on distinct booked days per month.
    pub max_booking_days_per_month: u32,
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            max_overrides_per_month: DEFAULT_MAX_OVERRIDES_PER_MONTH,
            max_booking_days_per_month: DEFAULT_MAX_BOOKING_DAYS_PER_MONTH,
        }
    }
}
