//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use covolt_core::ReservationError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A reservation rule rejected the request.
    #[error(transparent)]
    Reservation(#[from] ReservationError),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Reservation(err) => reservation_response(err),
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Map a reservation rejection to its HTTP representation.
///
/// Every variant keeps the stable code from [`ReservationError::code`], so
/// clients branch on codes rather than status classes or messages.
fn reservation_response(
    err: &ReservationError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    let status = match err {
        ReservationError::InvalidInterval
        | ReservationError::StartInPast
        | ReservationError::VehicleNotInGroup
        | ReservationError::InvalidShare(_) => StatusCode::BAD_REQUEST,
        ReservationError::NotAMember | ReservationError::Forbidden => StatusCode::FORBIDDEN,
        ReservationError::NotFound => StatusCode::NOT_FOUND,
        ReservationError::DayQuotaExceeded { .. }
        | ReservationError::SelfConflict
        | ReservationError::LowerOwnership
        | ReservationError::EqualOwnership
        | ReservationError::AlreadyTerminal { .. } => StatusCode::CONFLICT,
        ReservationError::OverrideLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        ReservationError::LockTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ReservationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReservationError::Directory(_) => StatusCode::BAD_GATEWAY,
    };

    if let ReservationError::Storage(msg) = err {
        tracing::error!(error = %msg, "Storage failure");
        return (
            status,
            err.code(),
            "An internal error occurred".to_string(),
            None,
        );
    }

    let details = match err {
        ReservationError::DayQuotaExceeded { days, max } => {
            Some(serde_json::json!({ "days": days, "max": max }))
        }
        ReservationError::OverrideLimitExceeded { used, max } => {
            Some(serde_json::json!({ "used": used, "max": max }))
        }
        ReservationError::AlreadyTerminal { status } => {
            Some(serde_json::json!({ "status": status }))
        }
        _ => None,
    };

    (status, err.code(), err.to_string(), details)
}
