//! Application state.

use std::sync::Arc;
use std::time::Duration;

use covolt_store::Store;

use crate::auth::JwtVerifier;
use crate::config::ServiceConfig;
use crate::engine::ReservationEngine;
use crate::groups::{GroupDirectory, GroupsClient, StaticDirectory};

/// Application state shared across handlers.
///
/// The state is wrapped in one `Arc` by the router. It is deliberately not
/// `Clone`: the engine's lock registries serialize mutations per vehicle and
/// must never be duplicated.
pub struct AppState {
    /// The reservation engine.
    pub engine: ReservationEngine,

    /// Service configuration.
    pub config: ServiceConfig,

    /// JWT verifier with its JWKS cache.
    pub jwks: JwtVerifier,
}

impl AppState {
    /// Create the application state, choosing the ownership registry from
    /// configuration.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let directory: Arc<dyn GroupDirectory> = match config
            .groups_api_url
            .as_ref()
            .zip(config.groups_api_key.as_ref())
        {
            Some((url, key)) => {
                tracing::info!(groups_url = %url, "Groups service integration enabled");
                Arc::new(GroupsClient::new(url.clone(), key.clone()))
            }
            None => {
                tracing::warn!(
                    "Groups service not configured - using the in-process static directory"
                );
                Arc::new(StaticDirectory::new())
            }
        };

        Self::with_directory(store, directory, config)
    }

    /// Create the application state with an explicit ownership registry.
    ///
    /// Test harnesses use this to keep a handle on the directory they seed.
    #[must_use]
    pub fn with_directory(
        store: Arc<dyn Store>,
        directory: Arc<dyn GroupDirectory>,
        config: ServiceConfig,
    ) -> Self {
        let engine = ReservationEngine::new(
            store,
            directory,
            config.policy.clone(),
            Duration::from_millis(config.lock_wait_ms),
        );
        let jwks = JwtVerifier::new(config.auth_base_url.clone(), config.auth_audience.clone());

        Self {
            engine,
            config,
            jwks,
        }
    }
}
