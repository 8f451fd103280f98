//! Fuzz test for record id parsing
//!
//! This fuzz target feeds arbitrary byte sequences to `RecordId::parse`
//! to find:
//! - Panics or crashes
//! - Accepted ids that violate the length or alphabet rules
//!
//! Run with: cargo +nightly fuzz run record_id_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use stash_core::{RecordId, ID_ALPHABET, ID_LEN};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing must never panic; rejection is the common outcome.
        if let Ok(id) = RecordId::parse(input) {
            // Anything accepted must be exactly the canonical shape.
            assert_eq!(id.as_str(), input, "Accepted id should echo its input");
            assert_eq!(id.as_str().len(), ID_LEN, "Accepted id should have canonical length");
            assert!(
                id.as_str().bytes().all(|b| ID_ALPHABET.contains(&b)),
                "Accepted id should stay inside the id alphabet"
            );
        }
    }
});
