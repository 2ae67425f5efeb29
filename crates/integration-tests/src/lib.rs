//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end add/increment/decrement flows
//! - `cart_restarts` - Persistence across store restarts (memory and file backends)
//! - `cart_failures` - Storage failures, corrupt data, and wiring errors
//!
//! Shared fixtures live here so each test file stays focused on behavior.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use go_marketplace_cart::{CartConfig, CartStore, KeyValueStore, StorageError};
use go_marketplace_core::CartProduct;
use rust_decimal::Decimal;

/// Storage key used by the default configuration.
pub const PRODUCTS_KEY: &str = "@GoMarketplace:products";

/// The shirt from the reference scenarios.
#[must_use]
pub fn shirt() -> CartProduct {
    CartProduct::new("p1", "Shirt", "u1", Decimal::from(10))
}

/// The hat from the reference scenarios.
#[must_use]
pub fn hat() -> CartProduct {
    CartProduct::new("p2", "Hat", "u2", Decimal::from(5))
}

/// Create, activate, and wait for a store over `storage`.
///
/// # Panics
///
/// Panics if the store fails to become ready.
pub async fn ready_store(storage: impl KeyValueStore + 'static) -> CartStore {
    let store = CartStore::new(storage, &CartConfig::default());
    store.activate();
    store
        .ready()
        .await
        .unwrap_or_else(|e| panic!("store did not become ready: {e}"));
    store
}

/// Storage whose reads and writes always fail.
#[derive(Debug, Clone, Default)]
pub struct BrokenStore {
    writes: Arc<AtomicUsize>,
}

impl BrokenStore {
    /// Number of write attempts seen so far.
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Backend("storage offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Backend("storage offline".to_string()))
    }
}
