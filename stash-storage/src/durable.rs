//! Durable Postgres-backed tier.
//!
//! Enabled only when a connection URL is configured. Schema bootstrap is
//! idempotent and bounded; if it cannot finish, the tier stays not-ready
//! for the life of the process and the rest of the system keeps serving
//! from memory and local disk. Every operation runs under a timeout so a
//! hung database bounds user-facing latency instead of inheriting it.

use crate::tier::{Tier, TierError};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use stash_core::{Document, RecordId};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::{info, warn};

const CREATE_RECORDS_TABLE: &str = "CREATE TABLE IF NOT EXISTS stash_records (
    id TEXT PRIMARY KEY,
    doc JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const SELECT_RECORD: &str = "SELECT doc FROM stash_records WHERE id = $1";

const UPSERT_RECORD: &str = "INSERT INTO stash_records (id, doc) VALUES ($1, $2) \
     ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc";

/// Connection settings for the durable tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurableConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Maximum pool size.
    pub pool_size: usize,
    /// Bound on individual get/put attempts, pool checkout included.
    pub op_timeout: Duration,
    /// Bound on schema bootstrap.
    pub bootstrap_timeout: Duration,
}

impl DurableConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 16,
            op_timeout: Duration::from_millis(2000),
            bootstrap_timeout: Duration::from_millis(5000),
        }
    }

    /// Set the maximum pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the per-operation bound.
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// Set the bootstrap bound.
    pub fn with_bootstrap_timeout(mut self, timeout: Duration) -> Self {
        self.bootstrap_timeout = timeout;
        self
    }
}

/// Pooled Postgres tier with a readiness gate.
///
/// `get`/`put` refuse with `Unavailable` until [`DurableTier::bootstrap`]
/// has created the records table. The gate never flips back: a bootstrap
/// that fails leaves the tier out of the cascade until restart.
pub struct DurableTier {
    pool: Pool,
    ready: AtomicBool,
    op_timeout: Duration,
    bootstrap_timeout: Duration,
}

impl DurableTier {
    /// Build the connection pool. No connection is attempted here; the
    /// first one happens in [`DurableTier::bootstrap`].
    pub fn connect(config: &DurableConfig) -> Result<Self, TierError> {
        let mut cfg = Config::new();
        cfg.url = Some(config.url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                TierError::unavailable("durable", format!("Failed to create pool: {}", e))
            })?;

        Ok(Self {
            pool,
            ready: AtomicBool::new(false),
            op_timeout: config.op_timeout,
            bootstrap_timeout: config.bootstrap_timeout,
        })
    }

    /// Whether bootstrap has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Create the records table if missing and mark the tier ready.
    ///
    /// Bounded by `bootstrap_timeout`. On failure or timeout the tier
    /// stays not-ready and the process continues on memory and local disk
    /// alone; there is no retry.
    pub async fn bootstrap(&self) {
        match tokio::time::timeout(self.bootstrap_timeout, self.ensure_schema()).await {
            Ok(Ok(())) => {
                self.ready.store(true, Ordering::Relaxed);
                info!("Durable tier ready");
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Durable tier bootstrap failed; continuing without it");
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.bootstrap_timeout.as_millis() as u64,
                    "Durable tier bootstrap timed out; continuing without it"
                );
            }
        }
    }

    async fn ensure_schema(&self) -> Result<(), TierError> {
        let conn = self.pool.get().await.map_err(|e| {
            TierError::unavailable("durable", format!("Failed to get connection: {}", e))
        })?;
        conn.execute(CREATE_RECORDS_TABLE, &[])
            .await
            .map_err(|e| TierError::unavailable("durable", e.to_string()))?;
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, TierError>
    where
        F: Future<Output = Result<T, TierError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TierError::timeout("durable", self.op_timeout)),
        }
    }
}

#[async_trait]
impl Tier for DurableTier {
    fn name(&self) -> &'static str {
        "durable"
    }

    fn ready(&self) -> bool {
        self.is_ready()
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Document>, TierError> {
        if !self.is_ready() {
            return Err(TierError::unavailable("durable", "not bootstrapped"));
        }
        self.bounded(async {
            let conn = self
                .pool
                .get()
                .await
                .map_err(|e| TierError::unavailable("durable", e.to_string()))?;
            let row = conn
                .query_opt(SELECT_RECORD, &[&id.as_str()])
                .await
                .map_err(|e| TierError::unavailable("durable", e.to_string()))?;
            match row {
                Some(row) => {
                    let doc: Document = row
                        .try_get(0)
                        .map_err(|e| TierError::corrupt("durable", e.to_string()))?;
                    Ok(Some(doc))
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn put(&self, id: &RecordId, doc: &Document) -> Result<(), TierError> {
        if !self.is_ready() {
            return Err(TierError::unavailable("durable", "not bootstrapped"));
        }
        self.bounded(async {
            let conn = self
                .pool
                .get()
                .await
                .map_err(|e| TierError::unavailable("durable", e.to_string()))?;
            conn.execute(UPSERT_RECORD, &[&id.as_str(), doc])
                .await
                .map_err(|e| TierError::unavailable("durable", e.to_string()))?;
            Ok(())
        })
        .await
    }
}

// =============================================================================
// TESTS
// =============================================================================
