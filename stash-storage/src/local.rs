//! Ephemeral on-disk tier.
//!
//! One JSON file per record (`<dir>/<id>.json`). Per-record files mean
//! writers of different ids never touch the same file, so there is no
//! shared index to race on; writers of the same id race benignly to
//! last-write-wins. Files are never deleted or expired, and the backing
//! directory is typically tmpfs, so the OS may reclaim it between runs.

use crate::tier::{Tier, TierError};
use async_trait::async_trait;
use stash_core::{Document, RecordId};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory candidates probed in order when none is configured.
pub const DEFAULT_DATA_DIRS: &[&str] = &["/tmp/stash_data", "stash_data"];

/// Filesystem-backed tier rooted at a writable directory.
#[derive(Debug)]
pub struct LocalTier {
    dir: PathBuf,
}

impl LocalTier {
    /// Open the tier rooted at `dir`, creating the directory if needed and
    /// verifying it is actually writable.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TierError> {
        let dir = dir.into();
        ensure_writable(&dir)
            .map_err(|e| TierError::unavailable("local", format!("{}: {}", dir.display(), e)))?;
        info!(dir = %dir.display(), "Local tier ready");
        Ok(Self { dir })
    }

    /// Probe `candidates` in order and open the first one that accepts a
    /// test write. Rejected candidates are logged and skipped.
    pub fn probe(candidates: &[PathBuf]) -> Result<Self, TierError> {
        for candidate in candidates {
            match ensure_writable(candidate) {
                Ok(()) => {
                    info!(dir = %candidate.display(), "Local tier ready");
                    return Ok(Self {
                        dir: candidate.clone(),
                    });
                }
                Err(e) => {
                    warn!(dir = %candidate.display(), error = %e, "Data directory candidate rejected");
                }
            }
        }
        Err(TierError::unavailable(
            "local",
            "no writable data directory among candidates",
        ))
    }

    /// Directory this tier stores records under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

/// Create `dir` if missing and round-trip a probe file through it.
fn ensure_writable(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".write_probe");
    std::fs::write(&probe, b"probe")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}

#[async_trait]
impl Tier for LocalTier {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Document>, TierError> {
        let path = self.record_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TierError::unavailable("local", e.to_string())),
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                // Torn or corrupt file behaves as absent; a later store
                // overwrites it.
                warn!(id = %id, path = %path.display(), error = %e, "Discarding unreadable record file");
                Ok(None)
            }
        }
    }

    async fn put(&self, id: &RecordId, doc: &Document) -> Result<(), TierError> {
        let path = self.record_path(id);
        let bytes =
            serde_json::to_vec(doc).map_err(|e| TierError::corrupt("local", e.to_string()))?;
        let len = bytes.len();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| TierError::unavailable("local", e.to_string()))?;
        debug!(id = %id, bytes = len, "Record written to local tier");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
