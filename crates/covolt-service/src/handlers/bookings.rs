//! Booking handlers.
//!
//! Create, move, cancel, and list reservations. All routes authenticate the
//! caller; mutations act for the authenticated user only.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use covolt_core::{
    Booking, BookingId, GroupId, ReservationError, TimeSlot, UserId, VehicleId,
};

use crate::auth::AuthUser;
use crate::engine::{BookingOutcome, CreateBooking, UpdateBooking};
use crate::error::ApiError;
use crate::handlers::quota::QuotaStatusResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// The vehicle to reserve.
    pub vehicle_id: String,
    /// The co-ownership group to book under.
    pub group_id: String,
    /// Slot start (RFC 3339).
    pub start: DateTime<Utc>,
    /// Slot end (RFC 3339), exclusive.
    pub end: DateTime<Utc>,
    /// Optional echo of the caller's user ID, rejected on mismatch.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Request to move a booking.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    /// New slot start (RFC 3339).
    pub start: DateTime<Utc>,
    /// New slot end (RFC 3339), exclusive.
    pub end: DateTime<Utc>,
    /// A different vehicle to move to, if any.
    #[serde(default)]
    pub vehicle_id: Option<String>,
}

/// One booking as returned by the API.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking ID (ULID).
    pub id: String,
    /// Reserved vehicle.
    pub vehicle_id: String,
    /// Group the booking was made under.
    pub group_id: String,
    /// Holder of the reservation.
    pub user_id: String,
    /// Slot start (RFC 3339).
    pub start: String,
    /// Slot end (RFC 3339), exclusive.
    pub end: String,
    /// Holder's ownership share at booking time, in percent.
    pub ownership_percent: f64,
    /// Lifecycle state: `booked`, `overridden`, or `canceled`.
    pub status: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last state change timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            vehicle_id: booking.vehicle_id.to_string(),
            group_id: booking.group_id.to_string(),
            user_id: booking.user_id.to_string(),
            start: booking.slot.start().to_rfc3339(),
            end: booking.slot.end().to_rfc3339(),
            ownership_percent: booking.ownership_snapshot.as_percent(),
            status: booking.status.to_string(),
            created_at: booking.created_at.to_rfc3339(),
            updated_at: booking.updated_at.to_rfc3339(),
        }
    }
}

/// Result of a create or update, including any overrides it caused.
#[derive(Debug, Serialize)]
pub struct BookingMutationResponse {
    /// The booking now holding the slot.
    pub booking: BookingResponse,
    /// IDs of bookings this one overrode.
    pub superseded: Vec<String>,
    /// Override budget after the charge, present when an override happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaStatusResponse>,
}

impl From<BookingOutcome> for BookingMutationResponse {
    fn from(outcome: BookingOutcome) -> Self {
        Self {
            booking: BookingResponse::from(&outcome.booking),
            superseded: outcome.superseded.iter().map(ToString::to_string).collect(),
            quota: outcome
                .quota
                .map(|record| QuotaStatusResponse::from(record.status())),
        }
    }
}

/// A list of bookings.
#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    /// The bookings.
    pub bookings: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingListResponse {
    fn from(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: bookings.iter().map(BookingResponse::from).collect(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a booking.
///
/// `POST /v1/bookings`
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<BookingMutationResponse>, ApiError> {
    // A client may echo the user it believes it acts for; a mismatch with the
    // token is an authorization error, not a validation error.
    if let Some(echo) = &request.user_id {
        let echoed = echo
            .parse::<UserId>()
            .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?;
        if echoed != user.user_id {
            return Err(ApiError::Reservation(ReservationError::Forbidden));
        }
    }

    let vehicle_id = request
        .vehicle_id
        .parse::<VehicleId>()
        .map_err(|_| ApiError::BadRequest("Invalid vehicle_id".to_string()))?;
    let group_id = request
        .group_id
        .parse::<GroupId>()
        .map_err(|_| ApiError::BadRequest("Invalid group_id".to_string()))?;
    let slot = TimeSlot::new(request.start, request.end)?;

    tracing::info!(
        user_id = %user.user_id,
        vehicle_id = %vehicle_id,
        start = %request.start,
        end = %request.end,
        "Processing booking request"
    );

    let outcome = state
        .engine
        .create(
            user.user_id,
            CreateBooking {
                vehicle_id,
                group_id,
                slot,
            },
        )
        .await?;

    Ok(Json(BookingMutationResponse::from(outcome)))
}

/// Move a booking to a new slot, and optionally a different vehicle.
///
/// `PUT /v1/bookings/:id`
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<BookingMutationResponse>, ApiError> {
    let booking_id = id
        .parse::<BookingId>()
        .map_err(|_| ApiError::BadRequest("Invalid booking id".to_string()))?;
    let vehicle_id = request
        .vehicle_id
        .as_deref()
        .map(str::parse::<VehicleId>)
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid vehicle_id".to_string()))?;
    let slot = TimeSlot::new(request.start, request.end)?;

    let outcome = state
        .engine
        .update(user.user_id, booking_id, UpdateBooking { slot, vehicle_id })
        .await?;

    Ok(Json(BookingMutationResponse::from(outcome)))
}

/// Cancel a booking.
///
/// `DELETE /v1/bookings/:id`
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = id
        .parse::<BookingId>()
        .map_err(|_| ApiError::BadRequest("Invalid booking id".to_string()))?;

    let canceled = state.engine.cancel(user.user_id, booking_id).await?;

    Ok(Json(BookingResponse::from(&canceled)))
}

/// List a group's bookings, terminal rows included.
///
/// `GET /v1/groups/:group_id/bookings`
pub async fn list_group_bookings(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(group_id): Path<String>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let group_id = group_id
        .parse::<GroupId>()
        .map_err(|_| ApiError::BadRequest("Invalid group_id".to_string()))?;

    let bookings = state.engine.list_group(&group_id)?;
    Ok(Json(BookingListResponse::from(bookings)))
}

/// List a vehicle's bookings ordered by slot start, terminal rows included.
///
/// `GET /v1/vehicles/:vehicle_id/bookings`
pub async fn list_vehicle_bookings(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let vehicle_id = vehicle_id
        .parse::<VehicleId>()
        .map_err(|_| ApiError::BadRequest("Invalid vehicle_id".to_string()))?;

    let bookings = state.engine.list_vehicle(&vehicle_id)?;
    Ok(Json(BookingListResponse::from(bookings)))
}
