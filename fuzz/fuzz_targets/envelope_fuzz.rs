//! Fuzz test for the compressed payload envelope
//!
//! This fuzz target drives the base64 -> zstd -> JSON decode pipeline
//! with arbitrary bytes to find panics or crashes in any decode stage,
//! for both a raw envelope payload and a whole request body.
//!
//! Run with: cargo +nightly fuzz run envelope_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use stash_api::{decode_envelope, unwrap_envelope};
use stash_core::Document;

const CAP: usize = 1 << 20;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Envelope text path: decode must return Ok or Err, never panic.
        let _ = decode_envelope(input, CAP);

        // Whole-body path: any JSON body goes through the envelope sniff
        // and either unwraps or passes through unchanged.
        if let Ok(doc) = serde_json::from_str::<Document>(input) {
            let _ = unwrap_envelope(doc, CAP);
        }
    }
});
