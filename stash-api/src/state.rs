//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use stash_storage::TieredStore;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Tiered record store behind every read and write.
    pub store: Arc<TieredStore>,
    /// Request body cap, which also bounds envelope decompression.
    pub max_body_bytes: usize,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<TieredStore>, max_body_bytes: usize) -> Self {
        Self {
            store,
            max_body_bytes,
            start_time: Instant::now(),
        }
    }

    /// Seconds since the server came up.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
