//! Volatile in-process tier.

use crate::tier::{Tier, TierError};
use async_trait::async_trait;
use dashmap::DashMap;
use stash_core::{Document, RecordId};

/// Fastest tier and the read-through target: every hit from a lower tier
/// gets copied back in here. Contents do not survive a restart, and no
/// operation on this tier can fail.
#[derive(Debug, Default)]
pub struct MemoryTier {
    records: DashMap<RecordId, Document>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record, exactly as a process restart would.
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Drop a single record.
    pub fn remove(&self, id: &RecordId) {
        self.records.remove(id);
    }

    /// Synchronous lookup for the coordinator hot path.
    pub fn lookup(&self, id: &RecordId) -> Option<Document> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    /// Synchronous insert, overwriting any previous record.
    pub fn insert(&self, id: RecordId, doc: Document) {
        self.records.insert(id, doc);
    }
}

#[async_trait]
impl Tier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Document>, TierError> {
        Ok(self.lookup(id))
    }

    async fn put(&self, id: &RecordId, doc: &Document) -> Result<(), TierError> {
        self.records.insert(id.clone(), doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let tier = MemoryTier::new();
        let id = RecordId::generate();
        let doc = json!({"title": "notes", "items": [1, 2, 3]});

        tier.put(&id, &doc).await.unwrap();
        assert_eq!(tier.get(&id).await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let tier = MemoryTier::new();
        let id = RecordId::parse("zzzzzz").unwrap();
        assert_eq!(tier.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let tier = MemoryTier::new();
        let id = RecordId::generate();

        tier.put(&id, &json!({"v": 1})).await.unwrap();
        tier.put(&id, &json!({"v": 2})).await.unwrap();

        assert_eq!(tier.get(&id).await.unwrap(), Some(json!({"v": 2})));
        assert_eq!(tier.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let tier = MemoryTier::new();
        for _ in 0..8 {
            tier.put(&RecordId::generate(), &json!(true)).await.unwrap();
        }
        assert_eq!(tier.len(), 8);

        tier.clear();
        assert!(tier.is_empty());
    }

    #[tokio::test]
    async fn test_null_document_is_storable() {
        let tier = MemoryTier::new();
        let id = RecordId::generate();

        tier.put(&id, &serde_json::Value::Null).await.unwrap();
        assert_eq!(
            tier.get(&id).await.unwrap(),
            Some(serde_json::Value::Null),
            "a stored null must stay distinguishable from an absent record"
        );
    }
}
