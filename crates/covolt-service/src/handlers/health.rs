//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// What `/health` reports.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process answers.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version the binary was built from.
    pub version: &'static str,
}

/// Liveness probe. Routed outside the API concurrency ceiling, so it keeps
/// answering while reservation requests queue.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "covolt",
        version: env!("CARGO_PKG_VERSION"),
    })
}
