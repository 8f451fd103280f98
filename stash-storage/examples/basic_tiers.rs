//! Basic Tiered Store Example
//!
//! Demonstrates the fundamental stash storage workflow:
//! 1. Open a local tier on a scratch directory
//! 2. Assemble the tiered store (memory + local, no database)
//! 3. Store a document and fetch it back
//! 4. Wipe the memory tier and watch the read-through repopulate it
//!
//! Run with: cargo run -p stash-storage --example basic_tiers

use std::sync::Arc;

use serde_json::json;
use stash_storage::{LocalTier, MemoryTier, Tier, TieredStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Stash Tiered Store Example ===\n");

    // Step 1: Open the local tier on a scratch directory
    let dir = tempfile::tempdir()?;
    let local = LocalTier::open(dir.path())?;
    println!("✓ Local tier ready");
    println!("  Directory: {}", local.dir().display());

    // Step 2: Assemble the store (no durable tier configured)
    let store = TieredStore::new(MemoryTier::new(), Arc::new(local) as Arc<dyn Tier>, None);
    println!("\n✓ Tiered store assembled (memory + local)");

    // Step 3: Store a document under a fresh id
    let doc = json!({
        "title": "Team checklist",
        "items": [
            { "done": true,  "text": "book the room" },
            { "done": false, "text": "send the agenda" },
        ],
    });
    let id = store.store(doc.clone()).await;
    println!("\n✓ Document stored");
    println!("  ID: {}", id);
    println!("  Memory records: {}", store.memory().len());

    // Step 4: Fetch straight from memory
    let fetched = store.fetch(&id).await.expect("record was just stored");
    assert_eq!(fetched, doc);
    println!("\n✓ Fetched from the memory tier");

    // Step 5: Wipe memory and read through from disk
    store.memory().clear();
    println!("\n✓ Memory tier cleared (simulated restart)");
    println!("  Memory records: {}", store.memory().len());

    let fetched = store
        .fetch(&id)
        .await
        .expect("local tier still holds the record");
    assert_eq!(fetched, doc);
    println!("\n✓ Fetched through the local tier");
    println!("  Memory records after read-through: {}", store.memory().len());

    println!("\n=== Example complete ===");
    Ok(())
}
