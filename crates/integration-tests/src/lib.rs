//! Integration tests for the Marketplace cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Store behavior through the provider scope
//! - `persistence` - File-backed persistence and restart hydration

use marketplace_cart::{CartConfig, CartStore, FileStore, PersistPolicy};
use std::path::Path;
use std::sync::Arc;

/// Build a durable-policy store persisting under `dir`.
///
/// Durable writes make test assertions on storage contents deterministic;
/// production defaults to best-effort.
#[must_use]
pub fn durable_file_store(dir: &Path) -> CartStore {
    let config = CartConfig {
        persist_policy: PersistPolicy::Durable,
        storage_dir: Some(dir.to_path_buf()),
        ..CartConfig::default()
    };
    CartStore::new(config, Arc::new(FileStore::new(dir)))
}

/// Install a test subscriber so warnings from recovered storage faults are
/// visible in test output. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("marketplace_cart=debug")
        .try_init();
}
