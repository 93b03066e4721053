//! Covolt Service - HTTP API for vehicle time-slot reservations.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covolt_service::{create_router, AppState, ServiceConfig};
use covolt_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,covolt=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Covolt Service");

    let config = ServiceConfig::from_env();
    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        groups_configured = %config.groups_api_url.is_some(),
        max_overrides_per_month = %config.policy.max_overrides_per_month,
        max_booking_days_per_month = %config.policy.max_booking_days_per_month,
        "Service configuration loaded"
    );

    tracing::info!(path = %config.data_dir, "Opening reservation store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    let state = AppState::new(store, config.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Listening");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
