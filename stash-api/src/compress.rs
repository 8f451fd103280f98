//! Compressed Payload Envelope
//!
//! Clients with large documents may wrap the request body as
//! `{"compressed": "<text>"}` where the text is a base64 (standard
//! alphabet) encoding of a zstd frame whose decompressed bytes are the
//! real JSON document. The envelope itself is never stored; only the
//! decoded document reaches the tier stack.
//!
//! Only the exact single-key shape is treated as an envelope. Anything
//! else, including objects that merely contain a `compressed` field among
//! others, is a plain document and passes through untouched.

use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zstd::stream::read::Decoder as ZstdDecoder;

use stash_core::Document;

/// Field name that marks a request body as an envelope.
pub const ENVELOPE_KEY: &str = "compressed";

/// Reasons an envelope failed to decode. All of them report as a 400 at
/// the HTTP boundary; none of them are retried.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Envelope is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Envelope is not a zstd frame: {0}")]
    Zstd(String),

    #[error("Decompressed payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decompressed payload exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Return the envelope text when `doc` has the exact envelope shape.
pub fn envelope_payload(doc: &Document) -> Option<&str> {
    let object = doc.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(ENVELOPE_KEY)?.as_str()
}

/// Decode an envelope's text into the document it carries.
///
/// `max_bytes` bounds the decompressed size so a small body cannot expand
/// past the configured request limit.
pub fn decode_envelope(payload: &str, max_bytes: usize) -> Result<Document, EnvelopeError> {
    let compressed = STANDARD.decode(payload)?;
    let raw = decompress_bounded(&compressed, max_bytes)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Unwrap `doc` when it is an envelope; return it unchanged otherwise.
pub fn unwrap_envelope(doc: Document, max_bytes: usize) -> Result<Document, EnvelopeError> {
    match envelope_payload(&doc) {
        Some(payload) => decode_envelope(payload, max_bytes),
        None => Ok(doc),
    }
}

fn decompress_bounded(compressed: &[u8], limit: usize) -> Result<Vec<u8>, EnvelopeError> {
    let decoder = ZstdDecoder::new(compressed).map_err(|e| EnvelopeError::Zstd(e.to_string()))?;
    let mut raw = Vec::new();
    // Read one byte past the limit so an over-limit frame is detectable
    // without decompressing the whole thing.
    decoder
        .take(limit as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| EnvelopeError::Zstd(e.to_string()))?;
    if raw.len() > limit {
        return Err(EnvelopeError::TooLarge { limit });
    }
    Ok(raw)
}
