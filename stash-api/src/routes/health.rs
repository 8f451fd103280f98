//! Health Check Endpoints
//!
//! - /api/ping - trivial liveness for dumb probes, kept from the original
//!   share service
//! - /health - process summary (status, version, uptime)
//! - /health/ready - per-tier readiness with live probes
//!
//! Readiness stays 200 for as long as the process can serve at all; the
//! memory tier alone can answer, so a failing lower tier degrades the
//! report instead of failing it.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use stash_storage::DurableState;

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Response for /api/ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

/// Response for /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Response for /health/ready.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub memory: ComponentHealth,
    pub local: ComponentHealth,
    pub durable: ComponentHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// Lifecycle label for tiers that have one (`disabled`,
    /// `bootstrapping`, `ready`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/ping - Simple liveness response
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// GET /health - Process summary
pub async fn health(State(state): State<AppState>) -> Json<HealthSummary> {
    Json(HealthSummary {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// GET /health/ready - Per-tier readiness
pub async fn readiness(State(state): State<AppState>) -> Json<HealthResponse> {
    // Memory is in-process and infallible.
    let memory = ComponentHealth {
        status: HealthStatus::Healthy,
        state: None,
        latency_ms: None,
        error: None,
    };

    let started = Instant::now();
    let local = match state.store.local_probe().await {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            state: None,
            latency_ms: Some(started.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            state: None,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let durable = check_durable(&state).await;

    let overall = if local.status == HealthStatus::Healthy
        && durable.status == HealthStatus::Healthy
    {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status: overall,
        message: None,
        details: Some(HealthDetails {
            memory,
            local,
            durable,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.uptime_seconds(),
        }),
    })
}

async fn check_durable(state: &AppState) -> ComponentHealth {
    match state.store.durable_state() {
        // Not configured is the normal single-node mode, not a defect.
        DurableState::Disabled => ComponentHealth {
            status: HealthStatus::Healthy,
            state: Some("disabled".to_string()),
            latency_ms: None,
            error: None,
        },
        DurableState::Bootstrapping => ComponentHealth {
            status: HealthStatus::Degraded,
            state: Some("bootstrapping".to_string()),
            latency_ms: None,
            error: None,
        },
        DurableState::Ready => {
            let started = Instant::now();
            match state.store.durable_probe().await {
                Some(Ok(())) => ComponentHealth {
                    status: HealthStatus::Healthy,
                    state: Some("ready".to_string()),
                    latency_ms: Some(started.elapsed().as_millis() as u64),
                    error: None,
                },
                Some(Err(e)) => ComponentHealth {
                    status: HealthStatus::Degraded,
                    state: Some("ready".to_string()),
                    latency_ms: None,
                    error: Some(e.to_string()),
                },
                None => ComponentHealth {
                    status: HealthStatus::Healthy,
                    state: Some("disabled".to_string()),
                    latency_ms: None,
                    error: None,
                },
            }
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the health router. `/api/ping` is mounted separately by the
/// top-level router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(readiness))
        .with_state(state)
}
