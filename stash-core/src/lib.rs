//! Stash Core - Identity and Payload Types
//!
//! Pure data types shared by every stash crate. No I/O and no business
//! logic live here.

pub mod identity;

pub use identity::{InvalidRecordId, RecordId, ID_ALPHABET, ID_LEN};

/// Stored payloads are opaque JSON documents.
///
/// Any JSON value is a valid document, including `null`. Holding a
/// `Document` therefore never implies "present": presence is expressed as
/// `Option<Document>` at the storage seams, so a stored `null` stays
/// distinguishable from an absent record.
pub type Document = serde_json::Value;
