//! API Configuration
//!
//! Environment-driven configuration for the HTTP server and the tier
//! stack. Every knob has a default, so a bare `stash-api` comes up with
//! memory and local tiers on port 8080 and no database.

use std::path::PathBuf;
use std::time::Duration;

use stash_storage::{DurableConfig, DEFAULT_DATA_DIRS};

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default request body cap (50 MiB, matching the share-link client's
/// largest exports).
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

// ============================================================================
// API CONFIG
// ============================================================================

/// HTTP server configuration.
///
/// Environment variables:
/// - `STASH_HOST`: bind address (default `0.0.0.0`)
/// - `STASH_PORT` / `PORT`: bind port (default 8080, `STASH_PORT` wins)
/// - `STASH_MAX_BODY_BYTES`: request body cap (default 50 MiB)
/// - `STASH_CORS_ORIGINS`: comma-separated allow-list (unset = any origin)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Bounds both the accepted request body and envelope decompression.
    pub max_body_bytes: usize,
    /// Allowed CORS origins. Empty allows every origin, the normal mode
    /// for a public share-link API.
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("STASH_HOST").unwrap_or(defaults.host),
            port: std::env::var("STASH_PORT")
                .ok()
                .or_else(|| std::env::var("PORT").ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_body_bytes: std::env::var("STASH_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            cors_origins: std::env::var("STASH_CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

// ============================================================================
// STORAGE CONFIG
// ============================================================================

/// Tier stack configuration.
///
/// Environment variables:
/// - `STASH_DATABASE_URL` / `POSTGRES_URL`: durable tier enabled iff set
///   (`STASH_DATABASE_URL` wins)
/// - `STASH_DATA_DIR`: explicit local-tier directory, tried before the
///   built-in candidates
/// - `STASH_DB_POOL_SIZE`: connection pool size
/// - `STASH_DB_OP_TIMEOUT_MS`: per-operation durable bound
/// - `STASH_DB_BOOTSTRAP_TIMEOUT_MS`: schema bootstrap bound
///
/// Unset knobs defer to the defaults baked into [`DurableConfig`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StorageConfig {
    pub database_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub pool_size: Option<usize>,
    pub op_timeout_ms: Option<u64>,
    pub bootstrap_timeout_ms: Option<u64>,
}

impl StorageConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("STASH_DATABASE_URL")
                .ok()
                .or_else(|| std::env::var("POSTGRES_URL").ok()),
            data_dir: std::env::var("STASH_DATA_DIR").ok().map(PathBuf::from),
            pool_size: std::env::var("STASH_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok()),
            op_timeout_ms: std::env::var("STASH_DB_OP_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            bootstrap_timeout_ms: std::env::var("STASH_DB_BOOTSTRAP_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Durable tier configuration, when a database URL is present.
    pub fn durable_config(&self) -> Option<DurableConfig> {
        let url = self.database_url.clone()?;
        let mut config = DurableConfig::new(url);
        if let Some(size) = self.pool_size {
            config = config.with_pool_size(size);
        }
        if let Some(ms) = self.op_timeout_ms {
            config = config.with_op_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.bootstrap_timeout_ms {
            config = config.with_bootstrap_timeout(Duration::from_millis(ms));
        }
        Some(config)
    }

    /// Local-tier directory candidates, in probe order.
    pub fn data_dir_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = &self.data_dir {
            candidates.push(dir.clone());
        }
        candidates.extend(DEFAULT_DATA_DIRS.iter().map(PathBuf::from));
        candidates
    }
}
