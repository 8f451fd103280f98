//! HTTP Routes
//!
//! Route handlers for the record share API, organized by concern:
//! - Record store/fetch under /api/records
//! - Ping and health endpoints
//! - CORS support for browser-based clients

pub mod health;
pub mod record;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use record::create_router as record_router;

/// Create the complete API router.
///
/// Layer order is outer to inner in execution: CORS, request tracing,
/// response compression, then the body limit in front of the handlers.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let cors = build_cors_layer(config);

    Router::new()
        .nest("/api/records", record::create_router(state.clone()))
        .route("/api/ping", get(health::ping))
        .nest("/health", health::create_router(state))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed, which is the
/// normal mode for a public share-link API. A non-empty list restricts
/// browsers to those origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
