//! Tier abstraction for record storage backends.
//!
//! Every storage level (memory map, local disk, durable database) exposes
//! the same two operations through [`Tier`], and the coordinator composes
//! them into one cascading store. An absent record is `Ok(None)`, never an
//! error: a `TierError` means the tier itself could not answer.

use async_trait::async_trait;
use stash_core::{Document, RecordId};
use std::time::Duration;
use thiserror::Error;

/// Failures a storage tier can report.
///
/// None of these abort a store or fetch as a whole; the coordinator logs
/// them and carries on with the remaining tiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TierError {
    #[error("Tier {tier} unavailable: {reason}")]
    Unavailable { tier: &'static str, reason: String },

    #[error("Tier {tier} timed out after {elapsed:?}")]
    Timeout {
        tier: &'static str,
        elapsed: Duration,
    },

    #[error("Tier {tier} holds corrupt data: {reason}")]
    Corrupt { tier: &'static str, reason: String },
}

impl TierError {
    pub fn unavailable(tier: &'static str, reason: impl Into<String>) -> Self {
        TierError::Unavailable {
            tier,
            reason: reason.into(),
        }
    }

    pub fn timeout(tier: &'static str, elapsed: Duration) -> Self {
        TierError::Timeout { tier, elapsed }
    }

    pub fn corrupt(tier: &'static str, reason: impl Into<String>) -> Self {
        TierError::Corrupt {
            tier,
            reason: reason.into(),
        }
    }

    /// Name of the tier that produced this error.
    pub fn tier(&self) -> &'static str {
        match self {
            TierError::Unavailable { tier, .. } => tier,
            TierError::Timeout { tier, .. } => tier,
            TierError::Corrupt { tier, .. } => tier,
        }
    }
}

/// One storage level in the cascade.
///
/// Implementations are thread-safe and cheap to share behind an `Arc`.
/// Writes overwrite unconditionally; there is no delete and no expiry.
#[async_trait]
pub trait Tier: Send + Sync {
    /// Short name used in logs ("memory", "local", "durable").
    fn name(&self) -> &'static str;

    /// Whether the tier can currently serve operations.
    ///
    /// Tiers with a startup phase (schema bootstrap) report `false` until
    /// it finishes; everyone else is always ready.
    fn ready(&self) -> bool {
        true
    }

    /// Look up a record. `Ok(None)` means the tier answered and the record
    /// is not there.
    async fn get(&self, id: &RecordId) -> Result<Option<Document>, TierError>;

    /// Write or overwrite a record.
    async fn put(&self, id: &RecordId, doc: &Document) -> Result<(), TierError>;
}

// =============================================================================
// TESTS
// =============================================================================
