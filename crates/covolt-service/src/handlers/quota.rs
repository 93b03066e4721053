//! Override quota handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use covolt_core::{GroupId, QuotaStatus};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// A member's override budget for the current month.
#[derive(Debug, Serialize)]
pub struct QuotaStatusResponse {
    /// Overrides consumed this month.
    pub overrides_used: u32,
    /// Overrides still available this month.
    pub overrides_remaining: u32,
    /// Configured monthly budget.
    pub max_overrides_per_month: u32,
    /// The month the figures apply to, as `YYYY-MM`.
    pub month: String,
    /// When the budget resets (RFC 3339).
    pub next_reset: String,
}

impl From<QuotaStatus> for QuotaStatusResponse {
    fn from(status: QuotaStatus) -> Self {
        Self {
            overrides_used: status.overrides_used,
            overrides_remaining: status.overrides_remaining,
            max_overrides_per_month: status.max_overrides_per_month,
            month: status.month.to_string(),
            next_reset: status.next_reset.to_rfc3339(),
        }
    }
}

/// The authenticated user's override budget in a group.
///
/// `GET /v1/groups/:group_id/quota`
pub async fn quota_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<String>,
) -> Result<Json<QuotaStatusResponse>, ApiError> {
    let group_id = group_id
        .parse::<GroupId>()
        .map_err(|_| ApiError::BadRequest("Invalid group_id".to_string()))?;

    let status = state.engine.quota_status(&user.user_id, &group_id)?;
    Ok(Json(QuotaStatusResponse::from(status)))
}
