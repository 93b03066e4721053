//! Ownership registry lookups.
//!
//! The reservation engine needs two facts it does not own: which group a
//! vehicle belongs to, and what share of that vehicle a user holds. Both come
//! from the groups service through [`GroupDirectory`]. Deployments without a
//! groups service (and every test) use [`StaticDirectory`] instead.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use covolt_core::{GroupId, OwnershipFact, OwnershipShare, ReservationError, UserId, VehicleId};

/// Errors from ownership registry lookups.
#[derive(Debug, Error)]
pub enum GroupsError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Groups API returned an error response.
    #[error("groups API returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// The registry returned data the engine cannot use.
    #[error("invalid registry data: {0}")]
    InvalidData(String),
}

impl From<GroupsError> for ReservationError {
    fn from(err: GroupsError) -> Self {
        ReservationError::Directory(err.to_string())
    }
}

/// Read access to the ownership registry.
///
/// Reads are unlocked snapshots. The engine resolves conflicts with whatever
/// shares it observed at request time; a concurrent share transfer lands on
/// the next request.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// The group a vehicle belongs to, or `None` if the vehicle is unknown.
    async fn vehicle_group(&self, vehicle_id: &VehicleId) -> Result<Option<GroupId>, GroupsError>;

    /// A member's share of a vehicle, or `None` if they hold none.
    async fn ownership(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        vehicle_id: &VehicleId,
    ) -> Result<Option<OwnershipFact>, GroupsError>;
}

// ============================================================================
// HTTP client
// ============================================================================

#[derive(Debug, Deserialize)]
struct VehicleEnvelope {
    vehicle: VehicleRecord,
}

#[derive(Debug, Deserialize)]
struct VehicleRecord {
    group_id: GroupId,
}

#[derive(Debug, Deserialize)]
struct MembershipEnvelope {
    membership: MembershipRecord,
}

#[derive(Debug, Deserialize)]
struct MembershipRecord {
    ownership_percent: f64,
}

/// HTTP client for the groups service.
pub struct GroupsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GroupsClient {
    /// Create a new groups client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Handle a response, treating 404 as `None` and other errors as `Api`.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, GroupsError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GroupsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response.json::<T>().await?))
    }
}

#[async_trait]
impl GroupDirectory for GroupsClient {
    async fn vehicle_group(&self, vehicle_id: &VehicleId) -> Result<Option<GroupId>, GroupsError> {
        let url = format!("{}/api/v1/vehicles/{}", self.base_url, vehicle_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let envelope: Option<VehicleEnvelope> = Self::handle_response(response).await?;
        Ok(envelope.map(|e| e.vehicle.group_id))
    }

    async fn ownership(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        vehicle_id: &VehicleId,
    ) -> Result<Option<OwnershipFact>, GroupsError> {
        let url = format!(
            "{}/api/v1/groups/{}/members/{}",
            self.base_url, group_id, user_id
        );

        let response = self
            .client
            .get(&url)
            .query(&[("vehicle_id", vehicle_id.to_string())])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let envelope: Option<MembershipEnvelope> = Self::handle_response(response).await?;
        match envelope {
            None => Ok(None),
            Some(e) => {
                let share = OwnershipShare::from_percent(e.membership.ownership_percent)
                    .map_err(|err| GroupsError::InvalidData(err.to_string()))?;
                Ok(Some(OwnershipFact {
                    group_id: *group_id,
                    user_id: *user_id,
                    vehicle_id: *vehicle_id,
                    share,
                }))
            }
        }
    }
}

// ============================================================================
// Static directory
// ============================================================================

/// In-memory ownership registry.
///
/// Backs deployments that configure no groups service, and every test.
/// Entries can be added while the service is running; reads observe whatever
/// was assigned most recently.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    vehicles: DashMap<VehicleId, GroupId>,
    members: DashMap<(GroupId, UserId, VehicleId), OwnershipShare>,
}

impl StaticDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a vehicle to a group.
    pub fn assign_vehicle(&self, vehicle_id: VehicleId, group_id: GroupId) {
        self.vehicles.insert(vehicle_id, group_id);
    }

    /// Record a member's share of a vehicle.
    pub fn set_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        vehicle_id: VehicleId,
        share: OwnershipShare,
    ) {
        self.members.insert((group_id, user_id, vehicle_id), share);
    }

    /// Remove a member's share of a vehicle.
    pub fn remove_member(&self, group_id: &GroupId, user_id: &UserId, vehicle_id: &VehicleId) {
        self.members.remove(&(*group_id, *user_id, *vehicle_id));
    }
}

#[async_trait]
impl GroupDirectory for StaticDirectory {
    async fn vehicle_group(&self, vehicle_id: &VehicleId) -> Result<Option<GroupId>, GroupsError> {
        Ok(self.vehicles.get(vehicle_id).map(|entry| *entry.value()))
    }

    async fn ownership(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        vehicle_id: &VehicleId,
    ) -> Result<Option<OwnershipFact>, GroupsError> {
        Ok(self
            .members
            .get(&(*group_id, *user_id, *vehicle_id))
            .map(|entry| OwnershipFact {
                group_id: *group_id,
                user_id: *user_id,
                vehicle_id: *vehicle_id,
                share: *entry.value(),
            }))
    }
}
