//! Service configuration.

use covolt_core::{
    ReservationPolicy, DEFAULT_MAX_BOOKING_DAYS_PER_MONTH, DEFAULT_MAX_OVERRIDES_PER_MONTH,
};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/covolt").
    pub data_dir: String,

    /// Identity provider base URL for JWT validation (default:
    /// `<https://id.covolt.io>`).
    pub auth_base_url: String,

    /// Expected JWT audience (default: "covolt").
    pub auth_audience: String,

    /// Group membership service URL (optional).
    pub groups_api_url: Option<String>,

    /// Group membership service API key (optional).
    pub groups_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Maximum in-flight requests on the `/v1` surface.
    pub max_concurrent_requests: usize,

    /// How long a request may wait for a vehicle or quota lock, in
    /// milliseconds, before failing with a concurrency timeout.
    pub lock_wait_ms: u64,

    /// Reservation limits.
    pub policy: ReservationPolicy,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/covolt".into()),
            auth_base_url: std::env::var("AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://id.covolt.io".into()),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "covolt".into()),
            groups_api_url: std::env::var("GROUPS_API_URL").ok(),
            groups_api_key: std::env::var("GROUPS_API_KEY").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
            lock_wait_ms: std::env::var("LOCK_WAIT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            policy: policy_from_env(),
        }
    }
}

/// Load reservation limits from environment variables.
fn policy_from_env() -> ReservationPolicy {
    ReservationPolicy {
        max_overrides_per_month: std::env::var("MAX_OVERRIDES_PER_MONTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_OVERRIDES_PER_MONTH),
        max_booking_days_per_month: std::env::var("MAX_BOOKING_DAYS_PER_MONTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_BOOKING_DAYS_PER_MONTH),
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/covolt".into(),
            auth_base_url: "https://id.covolt.io".into(),
            auth_audience: "covolt".into(),
            groups_api_url: None,
            groups_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            max_concurrent_requests: 256,
            lock_wait_ms: 5000,
            policy: ReservationPolicy::default(),
        }
    }
}
