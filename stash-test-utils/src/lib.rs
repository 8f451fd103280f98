//! Stash Test Utilities
//!
//! Centralized test infrastructure for the Stash workspace:
//! - Proptest generators for record ids and documents
//! - A mock tier with failure and latency knobs
//! - Pre-built fixtures for common scenarios
//! - Assertions for stash-specific validation

// Re-export the mock tier from its source crate
pub use stash_storage::MockTier;

// Re-export core types for convenience
pub use stash_core::{Document, InvalidRecordId, RecordId, ID_ALPHABET, ID_LEN};
pub use stash_storage::{DurableState, MemoryTier, Tier, TierError, TieredStore};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for stash types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a valid record id.
    pub fn arb_record_id() -> impl Strategy<Value = RecordId> {
        "[a-z0-9]{6}".prop_map(|s| RecordId::parse(&s).expect("generated id uses the id alphabet"))
    }

    /// Generate an arbitrary JSON document, nested up to three levels.
    ///
    /// Covers every JSON kind the store must hold, null included, since a
    /// stored null must stay distinguishable from an absent record.
    pub fn arb_document() -> impl Strategy<Value = Document> {
        let leaf = prop_oneof![
            Just(Document::Null),
            any::<bool>().prop_map(Document::from),
            any::<i64>().prop_map(Document::from),
            any::<f64>().prop_filter("stored numbers must stay finite", |f| f.is_finite())
                .prop_map(Document::from),
            "[a-zA-Z0-9 .:_-]{0,24}".prop_map(Document::from),
        ];
        leaf.prop_recursive(3, 32, 8, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..8).prop_map(Document::Array),
                proptest::collection::btree_map("[a-z_]{1,8}", inner, 0..8)
                    .prop_map(|entries| Document::Object(entries.into_iter().collect())),
            ]
        })
    }

    /// Generate an arbitrary non-null document, for tests that reserve
    /// null to mean something else.
    pub fn arb_object_document() -> impl Strategy<Value = Document> {
        proptest::collection::btree_map("[a-z_]{1,8}", arb_document(), 1..6)
            .prop_map(|entries| Document::Object(entries.into_iter().collect()))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common testing scenarios.

    use super::*;
    use std::sync::Arc;

    /// A realistic share payload in the shape clients actually send.
    pub fn sample_document() -> Document {
        serde_json::json!({
            "title": "Sprint planning",
            "items": [
                { "done": true,  "text": "collect estimates" },
                { "done": false, "text": "draft milestones" },
            ],
            "updated_at": "2026-08-12T09:30:00Z",
            "revision": 4,
        })
    }

    /// The smallest interesting payload.
    pub fn tiny_document() -> Document {
        serde_json::json!({ "v": 1 })
    }

    /// A store wired entirely to mock tiers, returned alongside the mocks
    /// so tests can inject failures and inspect writes per tier.
    pub fn mock_tiered_store() -> (TieredStore, Arc<MockTier>, Arc<MockTier>) {
        let local = Arc::new(MockTier::new());
        let durable = Arc::new(MockTier::new());
        let store = TieredStore::new(
            MemoryTier::new(),
            Arc::clone(&local) as Arc<dyn Tier>,
            Some(Arc::clone(&durable) as Arc<dyn Tier>),
        );
        (store, local, durable)
    }

    /// A store with mock local tier and no durable tier, the default
    /// deployment shape.
    pub fn local_only_store() -> (TieredStore, Arc<MockTier>) {
        let local = Arc::new(MockTier::new());
        let store = TieredStore::new(MemoryTier::new(), Arc::clone(&local) as Arc<dyn Tier>, None);
        (store, local)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for stash-specific validation.

    use super::*;

    /// Assert that an id string has exactly the generated shape: six
    /// characters, all from the id alphabet.
    pub fn assert_well_formed_id(id: &str) {
        assert_eq!(id.len(), ID_LEN, "id {:?} has wrong length", id);
        assert!(
            id.bytes().all(|b| ID_ALPHABET.contains(&b)),
            "id {:?} strays outside the id alphabet",
            id
        );
    }
}
