//! Stash API Server Entry Point
//!
//! Bootstraps configuration and the tier stack, then starts the Axum
//! HTTP server. The durable tier bootstraps in the background so startup
//! stays bounded even when the database is slow or down.

use std::net::SocketAddr;
use std::sync::Arc;

use stash_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, StorageConfig};
use stash_storage::{DurableTier, LocalTier, MemoryTier, Tier, TieredStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let api_config = ApiConfig::from_env();
    let storage_config = StorageConfig::from_env();

    // No writable directory at all is the one fatal startup condition.
    let local = LocalTier::probe(&storage_config.data_dir_candidates())
        .map_err(|e| ApiError::internal_error(format!("No writable data directory: {}", e)))?;

    let durable = match storage_config.durable_config() {
        Some(durable_config) => match DurableTier::connect(&durable_config) {
            Ok(tier) => Some(Arc::new(tier)),
            Err(e) => {
                tracing::warn!(error = %e, "Durable tier unavailable; continuing without it");
                None
            }
        },
        None => {
            tracing::info!("No database URL configured; durable tier disabled");
            None
        }
    };

    if let Some(tier) = &durable {
        let tier = Arc::clone(tier);
        tokio::spawn(async move { tier.bootstrap().await });
    }

    let store = TieredStore::new(
        MemoryTier::new(),
        Arc::new(local),
        durable.map(|tier| tier as Arc<dyn Tier>),
    );

    let state = AppState::new(Arc::new(store), api_config.max_body_bytes);
    let app = create_api_router(state, &api_config);

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting stash API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.host, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
