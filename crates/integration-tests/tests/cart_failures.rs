//! Storage failures, corrupt data, and wiring errors.
//!
//! None of these may break the in-memory cart: the session keeps working
//! even when durability is lost.

use std::time::Duration;

use go_marketplace_cart::{
    CartConfig, CartContext, CartError, CartStore, MemoryStore, RetryPolicy, StoreStatus,
};
use go_marketplace_core::ProductId;
use go_marketplace_integration_tests::{BrokenStore, PRODUCTS_KEY, ready_store, shirt};

fn quick_retry() -> CartConfig {
    CartConfig {
        write_retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        },
        ..CartConfig::default()
    }
}

// =============================================================================
// Storage Failures
// =============================================================================

#[tokio::test]
async fn test_unreadable_storage_starts_empty() {
    let store = ready_store(BrokenStore::default()).await;

    assert_eq!(store.status(), StoreStatus::Ready);
    assert!(store.products().unwrap().is_empty());
}

#[tokio::test]
async fn test_unwritable_storage_keeps_session_cart() {
    let storage = BrokenStore::default();
    let store = CartStore::new(storage.clone(), &quick_retry());
    store.activate();

    store.add_to_cart(shirt()).await.unwrap();
    store.increment(&ProductId::new("p1")).await.unwrap();
    store.flush().await.unwrap();

    assert_eq!(store.products().unwrap()[0].quantity.get(), 2);
    assert!(storage.write_attempts() >= 3);
}

// =============================================================================
// Corrupt Data
// =============================================================================

#[tokio::test]
async fn test_corrupt_json_starts_empty() {
    for raw in [
        "",
        "null",
        "{\"id\":\"p1\"}",
        "[{\"id\":\"p1\"}]",
        "[{\"id\":\"p1\",\"title\":\"Shirt\",\"image_url\":\"u1\",\"price\":10,\"quantity\":0}]",
    ] {
        let store = ready_store(MemoryStore::with_value(PRODUCTS_KEY, raw)).await;
        assert!(
            store.products().unwrap().is_empty(),
            "expected empty cart for {raw:?}"
        );
    }
}

#[tokio::test]
async fn test_corrupt_data_is_overwritten_by_next_change() {
    let storage = MemoryStore::with_value(PRODUCTS_KEY, "garbage");
    let store = ready_store(storage.clone()).await;

    store.add_to_cart(shirt()).await.unwrap();
    store.flush().await.unwrap();

    let store = ready_store(storage).await;
    assert_eq!(store.products().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_lines_are_merged_on_load() {
    let storage = MemoryStore::with_value(
        PRODUCTS_KEY,
        r#"[
            {"id":"p1","title":"Shirt","image_url":"u1","price":10,"quantity":1},
            {"id":"p1","title":"Shirt","image_url":"u1","price":10,"quantity":2}
        ]"#,
    );
    let store = ready_store(storage).await;

    let products = store.products().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].quantity.get(), 3);
}

// =============================================================================
// Wiring Errors
// =============================================================================

#[tokio::test]
async fn test_detached_context_fails_fast() {
    let context = CartContext::detached();
    assert!(matches!(context.cart(), Err(CartError::ContextUnavailable)));
}

#[tokio::test]
async fn test_store_without_activation_fails_fast() {
    let store = CartStore::new(MemoryStore::new(), &CartConfig::default());

    assert!(matches!(store.products(), Err(CartError::ContextUnavailable)));
    assert!(matches!(
        store.add_to_cart(shirt()).await,
        Err(CartError::ContextUnavailable)
    ));
}

#[tokio::test]
async fn test_provided_context_reaches_store() {
    let context = CartContext::provide(CartStore::new(MemoryStore::new(), &CartConfig::default()));
    let cart = context.cart().unwrap();

    cart.add_to_cart(shirt()).await.unwrap();
    assert_eq!(cart.products().unwrap().len(), 1);
}
