//! Request and response types for the covolt client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use covolt_core::{BookingId, BookingStatus, GroupId, UserId, VehicleId};

/// Request to create a booking.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBookingRequest {
    /// The vehicle to reserve.
    pub vehicle_id: VehicleId,
    /// The co-ownership group to book under.
    pub group_id: GroupId,
    /// Slot start.
    pub start: DateTime<Utc>,
    /// Slot end, exclusive.
    pub end: DateTime<Utc>,
    /// Optional echo of the acting user; the server rejects a mismatch with
    /// the bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// Request to move a booking to a new slot.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateBookingRequest {
    /// New slot start.
    pub start: DateTime<Utc>,
    /// New slot end, exclusive.
    pub end: DateTime<Utc>,
    /// A different vehicle to move to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<VehicleId>,
}

/// One booking as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingView {
    /// Booking ID.
    pub id: BookingId,
    /// Reserved vehicle.
    pub vehicle_id: VehicleId,
    /// Group the booking was made under.
    pub group_id: GroupId,
    /// Holder of the reservation.
    pub user_id: UserId,
    /// Slot start.
    pub start: DateTime<Utc>,
    /// Slot end, exclusive.
    pub end: DateTime<Utc>,
    /// Holder's ownership share at booking time, in percent.
    pub ownership_percent: f64,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Result of a create or update, including any overrides it caused.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingMutation {
    /// The booking now holding the slot.
    pub booking: BookingView,
    /// IDs of bookings this one overrode.
    pub superseded: Vec<BookingId>,
    /// Override budget after the charge, present when an override happened.
    pub quota: Option<QuotaView>,
}

/// A list of bookings.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingList {
    /// The bookings.
    pub bookings: Vec<BookingView>,
}

/// A member's override budget for the current month.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaView {
    /// Overrides consumed this month.
    pub overrides_used: u32,
    /// Overrides still available this month.
    pub overrides_remaining: u32,
    /// Configured monthly budget.
    pub max_overrides_per_month: u32,
    /// The month the figures apply to, as `YYYY-MM`.
    pub month: String,
    /// When the budget resets.
    pub next_reset: DateTime<Utc>,
}

/// API error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Stable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}
