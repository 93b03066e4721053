//! Common test utilities for covolt integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::Duration;
use tempfile::TempDir;

use covolt_core::{GroupId, MonthKey, OwnershipShare, ReservationPolicy, UserId, VehicleId};
use covolt_service::{create_router, AppState, GroupDirectory, ServiceConfig, StaticDirectory};
use covolt_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The seeded ownership registry.
    pub directory: Arc<StaticDirectory>,
    /// The default co-ownership group.
    pub group_id: GroupId,
    /// The default vehicle, assigned to `group_id`.
    pub vehicle_id: VehicleId,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and default limits.
    pub fn new() -> Self {
        Self::with_policy(ReservationPolicy::default())
    }

    /// Create a new test harness with explicit reservation limits.
    pub fn with_policy(policy: ReservationPolicy) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");
        let directory = Arc::new(StaticDirectory::new());

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_base_url: "http://localhost".into(),
            auth_audience: "covolt".into(),
            groups_api_url: None,
            groups_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            max_concurrent_requests: 256,
            lock_wait_ms: 5000,
            policy,
        };

        let group_id = GroupId::generate();
        let vehicle_id = VehicleId::generate();
        directory.assign_vehicle(vehicle_id, group_id);

        let state = AppState::with_directory(
            Arc::new(store),
            Arc::clone(&directory) as Arc<dyn GroupDirectory>,
            config,
        );
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            directory,
            group_id,
            vehicle_id,
        }
    }

    /// Register a new member of the default group and vehicle.
    pub fn add_member(&self, percent: f64) -> UserId {
        let user = UserId::generate();
        self.add_member_for_vehicle(user, self.vehicle_id, percent);
        user
    }

    /// Give a member a share of another vehicle in the default group.
    pub fn add_member_for_vehicle(&self, user: UserId, vehicle_id: VehicleId, percent: f64) {
        self.directory.set_member(
            self.group_id,
            user,
            vehicle_id,
            OwnershipShare::from_percent(percent).expect("valid percent"),
        );
    }

    /// Authorization header value for a user.
    pub fn auth_header(user_id: UserId) -> String {
        format!("Bearer test-token:{user_id}")
    }

    /// An RFC 3339 `(start, end)` pair on a given day of next month.
    ///
    /// Next month keeps slots in the future and inside one known month
    /// whatever day the tests run on.
    pub fn next_month_slot(day: i64, start_hour: i64, end_hour: i64) -> (String, String) {
        let base = MonthKey::current().next().first_instant();
        let start = base + Duration::days(day) + Duration::hours(start_hour);
        let end = base + Duration::days(day) + Duration::hours(end_hour);
        (start.to_rfc3339(), end.to_rfc3339())
    }

    /// Create a booking on the default vehicle, asserting success.
    pub async fn create_booking(
        &self,
        user: UserId,
        day: i64,
        start_hour: i64,
        end_hour: i64,
    ) -> serde_json::Value {
        self.create_booking_on(user, self.vehicle_id, day, start_hour, end_hour)
            .await
    }

    /// Create a booking on a specific vehicle, asserting success.
    pub async fn create_booking_on(
        &self,
        user: UserId,
        vehicle_id: VehicleId,
        day: i64,
        start_hour: i64,
        end_hour: i64,
    ) -> serde_json::Value {
        let (start, end) = Self::next_month_slot(day, start_hour, end_hour);
        let response = self
            .server
            .post("/v1/bookings")
            .add_header("authorization", Self::auth_header(user))
            .json(&serde_json::json!({
                "vehicle_id": vehicle_id.to_string(),
                "group_id": self.group_id.to_string(),
                "start": start,
                "end": end,
            }))
            .await;
        response.assert_status_ok();
        response.json::<serde_json::Value>()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
