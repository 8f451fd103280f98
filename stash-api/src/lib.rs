//! Stash API - HTTP Boundary
//!
//! Axum HTTP layer over the tiered record store: store/fetch routes, the
//! compressed-payload envelope, health endpoints, and environment-driven
//! configuration. Everything stateful lives in [`stash_storage`]; this
//! crate only validates, decodes, and translates errors to HTTP.

pub mod compress;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use compress::{decode_envelope, envelope_payload, unwrap_envelope, EnvelopeError, ENVELOPE_KEY};
pub use config::{ApiConfig, StorageConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
