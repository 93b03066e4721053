//! Covolt HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use covolt_core::{BookingId, GroupId, VehicleId};

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, BookingList, BookingMutation, BookingView, CreateBookingRequest, QuotaView,
    UpdateBookingRequest,
};

/// Covolt API client.
///
/// Provides methods for creating, moving, and canceling bookings, and for
/// reading listings and the caller's override budget. Every request carries
/// the bearer token the client was built with; the server acts for the user
/// that token authenticates.
#[derive(Debug, Clone)]
pub struct CovoltClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl CovoltClient {
    /// Create a new covolt client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the covolt service (e.g., `"http://covolt:8080"`)
    /// * `bearer_token` - JWT for the acting user
    #[must_use]
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self::with_options(base_url, bearer_token, ClientOptions::default())
    }

    /// Create a new covolt client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    /// Create a booking.
    ///
    /// A successful response may report superseded bookings and the override
    /// budget spent winning the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the
    /// booking; see [`ClientError`] for the rejection variants.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingMutation, ClientError> {
        let url = format!("{}/v1/bookings", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", self.auth_header())
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Move a booking to a new slot, and optionally to a different vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the move.
    pub async fn update_booking(
        &self,
        booking_id: BookingId,
        request: UpdateBookingRequest,
    ) -> Result<BookingMutation, ClientError> {
        let url = format!("{}/v1/bookings/{booking_id}", self.base_url);

        let response = self
            .client
            .put(&url)
            .header("authorization", self.auth_header())
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Cancel a booking held by the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyTerminal`] if the booking was already
    /// canceled or overridden, [`ClientError::NotFound`] if it does not
    /// exist.
    pub async fn cancel_booking(&self, booking_id: BookingId) -> Result<BookingView, ClientError> {
        let url = format!("{}/v1/bookings/{booking_id}", self.base_url);

        let response = self
            .client
            .delete(&url)
            .header("authorization", self.auth_header())
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// List a group's bookings, terminal rows included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_group_bookings(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<BookingView>, ClientError> {
        let url = format!("{}/v1/groups/{group_id}/bookings", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", self.auth_header())
            .send()
            .await?;

        let list: BookingList = Self::handle_response(response).await?;
        Ok(list.bookings)
    }

    /// List a vehicle's bookings ordered by slot start, terminal rows
    /// included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_vehicle_bookings(
        &self,
        vehicle_id: &VehicleId,
    ) -> Result<Vec<BookingView>, ClientError> {
        let url = format!("{}/v1/vehicles/{vehicle_id}/bookings", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", self.auth_header())
            .send()
            .await?;

        let list: BookingList = Self::handle_response(response).await?;
        Ok(list.bookings)
    }

    /// The acting user's override budget in a group for the current month.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn quota_status(&self, group_id: &GroupId) -> Result<QuotaView, ClientError> {
        let url = format!("{}/v1/groups/{group_id}/quota", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", self.auth_header())
            .send()
            .await?;

        Self::handle_response(response).await
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let details = api_error.error.details.as_ref();

                tracing::debug!(
                    code,
                    status = status.as_u16(),
                    message = %api_error.error.message,
                    "covolt request rejected"
                );

                // Map the stable reason codes to typed errors
                match code {
                    "override_limit_exceeded" => Err(ClientError::OverrideLimitExceeded {
                        used: detail_u32(details, "used"),
                        max: detail_u32(details, "max"),
                    }),
                    "day_quota_exceeded" => Err(ClientError::DayQuotaExceeded {
                        days: detail_u32(details, "days"),
                        max: detail_u32(details, "max"),
                    }),
                    "lower_ownership_conflict" => Err(ClientError::LowerOwnership {
                        message: api_error.error.message,
                    }),
                    "equal_ownership_conflict" => Err(ClientError::EqualOwnership {
                        message: api_error.error.message,
                    }),
                    "self_conflict" => Err(ClientError::SelfConflict {
                        message: api_error.error.message,
                    }),
                    "already_terminal" => Err(ClientError::AlreadyTerminal {
                        status: details
                            .and_then(|d| d.get("status"))
                            .and_then(serde_json::Value::as_str)
                            .unwrap_or("terminal")
                            .to_string(),
                    }),
                    "not_found" => Err(ClientError::NotFound),
                    "concurrency_timeout" => Err(ClientError::EngineBusy {
                        message: api_error.error.message,
                    }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message: api_error.error.message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Pull a u32 field out of an error `details` object, defaulting to 0.
fn detail_u32(details: Option<&serde_json::Value>, field: &str) -> u32 {
    details
        .and_then(|d| d.get(field))
        .and_then(serde_json::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
