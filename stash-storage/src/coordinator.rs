//! Cascading store/fetch across the tier set.
//!
//! Reads go memory, then durable (bounded), then local, and every hit
//! from a lower tier repopulates memory. Writes land in memory
//! unconditionally, then best-effort on local disk, then fire-and-forget
//! on the durable tier. Tiers may legitimately disagree at any moment;
//! reads reconcile through the cascade instead of transactions.

use crate::memory::MemoryTier;
use crate::tier::Tier;
use stash_core::{Document, RecordId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reported durable-tier condition, for health endpoints and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurableState {
    /// No connection URL was configured.
    Disabled,
    /// Configured, but schema bootstrap has not (or never) finished.
    Bootstrapping,
    /// Bootstrapped and accepting operations.
    Ready,
}

/// The tier set behind `store` and `fetch`.
///
/// Memory is held concretely because it is infallible and queried
/// synchronously on the hot path; the lower tiers are trait objects so
/// tests can substitute doubles per tier.
pub struct TieredStore {
    memory: MemoryTier,
    local: Arc<dyn Tier>,
    durable: Option<Arc<dyn Tier>>,
}

impl TieredStore {
    /// Assemble a store from its tiers.
    pub fn new(memory: MemoryTier, local: Arc<dyn Tier>, durable: Option<Arc<dyn Tier>>) -> Self {
        Self {
            memory,
            local,
            durable,
        }
    }

    /// The memory tier, exposed for health reporting and for tests that
    /// simulate cache loss.
    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    /// Current condition of the durable tier.
    pub fn durable_state(&self) -> DurableState {
        match &self.durable {
            None => DurableState::Disabled,
            Some(tier) if tier.ready() => DurableState::Ready,
            Some(_) => DurableState::Bootstrapping,
        }
    }

    /// End-to-end probe of the durable tier with a throwaway id.
    ///
    /// `None` when the tier is not configured; otherwise the result of a
    /// real lookup through pool and query machinery (a miss counts as
    /// healthy).
    pub async fn durable_probe(&self) -> Option<Result<(), crate::tier::TierError>> {
        match &self.durable {
            None => None,
            Some(tier) => Some(tier.get(&RecordId::generate()).await.map(|_| ())),
        }
    }

    /// End-to-end probe of the local tier with a throwaway id. A miss
    /// counts as healthy.
    pub async fn local_probe(&self) -> Result<(), crate::tier::TierError> {
        self.local.get(&RecordId::generate()).await.map(|_| ())
    }

    /// Store a document under a fresh random id and return the id.
    ///
    /// Succeeds as soon as the memory write lands; everything below that
    /// is best-effort.
    pub async fn store(&self, doc: Document) -> RecordId {
        let id = RecordId::generate();
        self.store_as(id.clone(), doc).await;
        id
    }

    /// Store a document under a caller-chosen id, overwriting whatever was
    /// there. This is also the collision semantics: a colliding generated
    /// id silently replaces the older record on every tier.
    pub async fn store_as(&self, id: RecordId, doc: Document) {
        self.memory.insert(id.clone(), doc.clone());

        if let Err(e) = self.local.put(&id, &doc).await {
            warn!(id = %id, error = %e, "Local tier write failed; record stays cached in memory");
        }

        if let Some(durable) = &self.durable {
            let durable = Arc::clone(durable);
            // Detached so request latency never includes the database.
            tokio::spawn(async move {
                if let Err(e) = durable.put(&id, &doc).await {
                    warn!(id = %id, error = %e, "Durable tier write failed");
                }
            });
        }
    }

    /// Fetch a document by id.
    ///
    /// Tier failures degrade to the next tier; the only outcomes are the
    /// document or `None`.
    pub async fn fetch(&self, id: &RecordId) -> Option<Document> {
        if let Some(doc) = self.memory.lookup(id) {
            debug!(id = %id, tier = "memory", "Record hit");
            return Some(doc);
        }

        if let Some(durable) = &self.durable {
            match durable.get(id).await {
                Ok(Some(doc)) => {
                    debug!(id = %id, tier = "durable", "Record hit; repopulating memory");
                    self.memory.insert(id.clone(), doc.clone());
                    return Some(doc);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(id = %id, error = %e, "Durable tier read failed; falling back");
                }
            }
        }

        match self.local.get(id).await {
            Ok(Some(doc)) => {
                debug!(id = %id, tier = "local", "Record hit; repopulating memory");
                self.memory.insert(id.clone(), doc.clone());
                Some(doc)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(id = %id, error = %e, "Local tier read failed");
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalTier;
    use crate::MockTier;
    use proptest::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn disk_store() -> (TieredStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let local = LocalTier::open(dir.path()).unwrap();
        let store = TieredStore::new(MemoryTier::new(), Arc::new(local), None);
        (store, dir)
    }

    fn mock_store(local: Arc<MockTier>, durable: Option<Arc<MockTier>>) -> TieredStore {
        TieredStore::new(
            MemoryTier::new(),
            local as Arc<dyn Tier>,
            durable.map(|d| d as Arc<dyn Tier>),
        )
    }

    #[tokio::test]
    async fn test_store_fetch_roundtrip() {
        let (store, _dir) = disk_store();
        let doc = json!({"kind": "share", "payload": {"a": [1, 2, 3]}});

        let id = store.store(doc.clone()).await;
        assert_eq!(store.fetch(&id).await, Some(doc));
    }

    #[tokio::test]
    async fn test_store_as_last_write_wins() {
        let (store, _dir) = disk_store();
        let id = RecordId::generate();

        store.store_as(id.clone(), json!({"v": 1})).await;
        store.store_as(id.clone(), json!({"v": 2})).await;

        assert_eq!(store.fetch(&id).await, Some(json!({"v": 2})));
        assert_eq!(store.memory().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_falls_back_after_memory_loss() {
        let (store, _dir) = disk_store();
        let doc = json!({"survives": "restart-ish"});
        let id = store.store(doc.clone()).await;

        store.memory().clear();
        assert!(store.memory().is_empty());

        assert_eq!(store.fetch(&id).await, Some(doc));
        assert_eq!(store.memory().len(), 1, "hit must repopulate memory");
    }

    #[tokio::test]
    async fn test_fetch_uses_durable_when_local_down() {
        let local = Arc::new(MockTier::new());
        let durable = Arc::new(MockTier::new());
        let id = RecordId::generate();
        let doc = json!({"from": "durable"});
        durable.seed(id.clone(), doc.clone());
        local.set_fail_gets(true);

        let store = mock_store(local, Some(durable));
        assert_eq!(store.fetch(&id).await, Some(doc));
        assert_eq!(store.memory().len(), 1, "hit must repopulate memory");
    }

    #[tokio::test]
    async fn test_durable_miss_falls_through_to_local() {
        let local = Arc::new(MockTier::new());
        let durable = Arc::new(MockTier::new());
        let id = RecordId::generate();
        let doc = json!({"from": "local"});
        local.seed(id.clone(), doc.clone());

        let store = mock_store(Arc::clone(&local), Some(Arc::clone(&durable)));
        assert_eq!(store.fetch(&id).await, Some(doc));
        assert_eq!(durable.get_calls(), 1, "durable consulted before local");
    }

    #[tokio::test]
    async fn test_durable_failure_degrades_to_local() {
        let local = Arc::new(MockTier::new());
        let durable = Arc::new(MockTier::new());
        let id = RecordId::generate();
        let doc = json!([null, true, 0]);
        local.seed(id.clone(), doc.clone());
        durable.set_fail_gets(true);

        let store = mock_store(local, Some(durable));
        assert_eq!(store.fetch(&id).await, Some(doc));
    }

    #[tokio::test]
    async fn test_local_write_failure_does_not_fail_store() {
        let local = Arc::new(MockTier::new());
        local.set_fail_puts(true);
        let store = mock_store(Arc::clone(&local), None);

        let doc = json!({"kept": "in memory only"});
        let id = store.store(doc.clone()).await;

        assert_eq!(local.len(), 0);
        assert_eq!(store.fetch(&id).await, Some(doc));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_durable_write_is_detached() {
        let local = Arc::new(MockTier::new());
        let durable = Arc::new(MockTier::new());
        durable.set_put_delay(Duration::from_millis(100));

        let store = mock_store(local, Some(Arc::clone(&durable)));
        let doc = json!({"lands": "later"});
        let id = store.store(doc.clone()).await;

        // store() returned before the delayed durable put could finish.
        assert_eq!(durable.value_of(&id), None);

        // The detached task completes on its own.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while durable.value_of(&id).is_none() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "detached durable write never landed"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(durable.value_of(&id), Some(doc));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_stay_independent() {
        let dir = TempDir::new().unwrap();
        let local = LocalTier::open(dir.path()).unwrap();
        let store = Arc::new(TieredStore::new(MemoryTier::new(), Arc::new(local), None));

        let mut handles = Vec::new();
        for i in 0..32u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let doc = json!({"worker": i});
                let id = store.store(doc.clone()).await;
                (id, doc)
            }));
        }

        for handle in handles {
            let (id, doc) = handle.await.unwrap();
            assert_eq!(store.fetch(&id).await, Some(doc));
        }
    }

    #[tokio::test]
    async fn test_miss_is_distinct_from_stored_null() {
        let (store, _dir) = disk_store();

        let id = store.store(serde_json::Value::Null).await;
        assert_eq!(store.fetch(&id).await, Some(serde_json::Value::Null));

        let unknown = RecordId::parse("zzzzzz").unwrap();
        assert_eq!(store.fetch(&unknown).await, None);
    }

    #[tokio::test]
    async fn test_durable_state_reporting() {
        let local = Arc::new(MockTier::new());
        let store = mock_store(Arc::clone(&local), None);
        assert_eq!(store.durable_state(), DurableState::Disabled);
        assert!(store.durable_probe().await.is_none());

        let durable = Arc::new(MockTier::new());
        let store = mock_store(Arc::clone(&local), Some(Arc::clone(&durable)));
        assert_eq!(store.durable_state(), DurableState::Ready);
        assert!(store.durable_probe().await.unwrap().is_ok());

        durable.set_ready(false);
        assert_eq!(store.durable_state(), DurableState::Bootstrapping);
    }

    #[tokio::test]
    async fn test_local_probe_reflects_tier_health() {
        let local = Arc::new(MockTier::new());
        let store = mock_store(Arc::clone(&local), None);
        assert!(store.local_probe().await.is_ok());

        local.set_fail_gets(true);
        assert!(store.local_probe().await.is_err());
    }

    fn document_strategy() -> impl Strategy<Value = Document> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6)
                    .prop_map(serde_json::Value::Array),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..6).prop_map(|m| {
                    serde_json::Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: any JSON document survives store/fetch unchanged, both
        /// from memory and from the local tier after cache loss.
        #[test]
        fn prop_store_fetch_roundtrip(doc in document_strategy()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let (store, _dir) = disk_store();
                let id = store.store(doc.clone()).await;
                prop_assert_eq!(store.fetch(&id).await, Some(doc.clone()));

                store.memory().clear();
                prop_assert_eq!(store.fetch(&id).await, Some(doc));
                Ok(())
            })?;
        }
    }
}
