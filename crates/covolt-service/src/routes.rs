//! Route table and middleware stack.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{bookings, health, quota};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Bookings (Covolt-ID JWT auth)
/// - `POST /v1/bookings` - Create a booking
/// - `PUT /v1/bookings/:id` - Move a booking
/// - `DELETE /v1/bookings/:id` - Cancel a booking
/// - `GET /v1/groups/:group_id/bookings` - List a group's bookings
/// - `GET /v1/vehicles/:vehicle_id/bookings` - List a vehicle's bookings
///
/// ## Quota (Covolt-ID JWT auth)
/// - `GET /v1/groups/:group_id/quota` - Current user's override budget
pub fn create_router(state: AppState) -> Router {
    // Copy config values out before the state moves into the router.
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;
    let max_concurrent_requests = state.config.max_concurrent_requests;

    let state = Arc::new(state);

    // Reservation routes share a concurrency ceiling. Health stays outside it
    // so probes keep answering while the engine queues requests.
    let api = Router::new()
        .route("/v1/bookings", post(bookings::create_booking))
        .route("/v1/bookings/:id", put(bookings::update_booking))
        .route("/v1/bookings/:id", delete(bookings::cancel_booking))
        .route(
            "/v1/groups/:group_id/bookings",
            get(bookings::list_group_bookings),
        )
        .route(
            "/v1/vehicles/:vehicle_id/bookings",
            get(bookings::list_vehicle_bookings),
        )
        .route("/v1/groups/:group_id/quota", get(quota::quota_status))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins. Origins that fail to parse
/// as header values are dropped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
