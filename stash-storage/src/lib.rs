//! Stash Storage - Tiered Record Store
//!
//! Three storage levels behind one [`Tier`] trait: a volatile memory map
//! (the read-through target), one JSON file per record on local disk, and
//! an optional durable Postgres table. [`TieredStore`] cascades reads and
//! fans out writes across them; no tier failure is fatal to a store or
//! fetch.

pub mod coordinator;
pub mod durable;
pub mod local;
pub mod memory;
pub mod tier;

pub use coordinator::{DurableState, TieredStore};
pub use durable::{DurableConfig, DurableTier};
pub use local::{LocalTier, DEFAULT_DATA_DIRS};
pub use memory::MemoryTier;
pub use tier::{Tier, TierError};

use async_trait::async_trait;
use stash_core::{Document, RecordId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

// ============================================================================
// MOCK TIER
// ============================================================================

/// Configurable in-memory [`Tier`] double for tests across the workspace.
///
/// Behaves like a correct tier until told otherwise: failure injection per
/// operation, an optional delay on `put` (for observing detached writes),
/// a readiness override, and call counters.
pub struct MockTier {
    records: Mutex<HashMap<RecordId, Document>>,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
    ready: AtomicBool,
    put_delay: Mutex<Option<Duration>>,
    get_calls: AtomicU64,
    put_calls: AtomicU64,
}

impl MockTier {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_gets: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            ready: AtomicBool::new(true),
            put_delay: Mutex::new(None),
            get_calls: AtomicU64::new(0),
            put_calls: AtomicU64::new(0),
        }
    }

    /// Pre-load a record without counting a put call.
    pub fn seed(&self, id: RecordId, doc: Document) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, doc);
    }

    /// Make every subsequent `get` fail with `Unavailable`.
    pub fn set_fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent `put` fail with `Unavailable`.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::Relaxed);
    }

    /// Override what [`Tier::ready`] reports.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    /// Delay every subsequent `put` by `delay` before it takes effect.
    pub fn set_put_delay(&self, delay: Duration) {
        *self
            .put_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::Relaxed)
    }

    pub fn put_calls(&self) -> u64 {
        self.put_calls.load(Ordering::Relaxed)
    }

    /// Direct look at what the mock holds, bypassing failure injection.
    pub fn value_of(&self, id: &RecordId) -> Option<Document> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockTier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tier for MockTier {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Document>, TierError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_gets.load(Ordering::Relaxed) {
            return Err(TierError::unavailable("mock", "get failures enabled"));
        }
        Ok(self.value_of(id))
    }

    async fn put(&self, id: &RecordId, doc: &Document) -> Result<(), TierError> {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
        let delay = *self
            .put_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_puts.load(Ordering::Relaxed) {
            return Err(TierError::unavailable("mock", "put failures enabled"));
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_behaves_like_a_tier() {
        let tier = MockTier::new();
        let id = RecordId::generate();
        let doc = json!({"mock": true});

        tier.put(&id, &doc).await.unwrap();
        assert_eq!(tier.get(&id).await.unwrap(), Some(doc));
        assert_eq!(tier.put_calls(), 1);
        assert_eq!(tier.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let tier = MockTier::new();
        let id = RecordId::generate();

        tier.set_fail_puts(true);
        assert!(tier.put(&id, &json!(1)).await.is_err());
        assert!(tier.is_empty(), "failed put must not store anything");

        tier.set_fail_puts(false);
        tier.set_fail_gets(true);
        tier.put(&id, &json!(1)).await.unwrap();
        assert!(tier.get(&id).await.is_err());
        assert_eq!(tier.value_of(&id), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_mock_ready_override() {
        let tier = MockTier::new();
        assert!(tier.ready());
        tier.set_ready(false);
        assert!(!tier.ready());
    }
}
