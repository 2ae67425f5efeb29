//! Persistence across store restarts.
//!
//! A "restart" drops every handle to a store and opens a new one over the
//! same storage, the way the app does on relaunch.

use go_marketplace_cart::{CartConfig, CartStore, FileStore, KeyValueStore, MemoryStore};
use go_marketplace_core::ProductId;
use go_marketplace_integration_tests::{PRODUCTS_KEY, hat, ready_store, shirt};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_memory_restart_restores_cart() {
    let storage = MemoryStore::new();

    {
        let store = ready_store(storage.clone()).await;
        store.add_to_cart(shirt()).await.unwrap();
        store.add_to_cart(hat()).await.unwrap();
        store.increment(&ProductId::new("p2")).await.unwrap();
        store.flush().await.unwrap();
    }

    let store = ready_store(storage).await;
    let products = store.products().unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product(), shirt());
    assert_eq!(products[0].quantity.get(), 1);
    assert_eq!(products[1].product(), hat());
    assert_eq!(products[1].quantity.get(), 2);
}

#[tokio::test]
async fn test_file_restart_restores_cart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = ready_store(FileStore::new(dir.path())).await;
        store.add_to_cart(shirt()).await.unwrap();
        store.add_to_cart(shirt()).await.unwrap();
        store.flush().await.unwrap();
    }

    let store = ready_store(FileStore::new(dir.path())).await;
    let products = store.products().unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].quantity.get(), 2);
}

#[tokio::test]
async fn test_file_format_matches_stored_layout() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path());

    let store = ready_store(storage.clone()).await;
    store.add_to_cart(hat()).await.unwrap();
    store.flush().await.unwrap();

    let raw = storage.get(PRODUCTS_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let line = &value[0];

    assert_eq!(line["id"], "p2");
    assert_eq!(line["title"], "Hat");
    assert_eq!(line["image_url"], "u2");
    assert_eq!(line["price"].as_f64(), Some(5.0));
    assert_eq!(line["quantity"], 1);
    assert_eq!(line.as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn test_pending_write_survives_drop() {
    let storage = MemoryStore::new();

    {
        let store = ready_store(storage.clone()).await;
        store.add_to_cart(shirt()).await.unwrap();
        // No flush: the writer still owns the last snapshot
    }

    // Give the writer a chance to drain after the store is gone
    for _ in 0..100 {
        if storage.get(PRODUCTS_KEY).await.unwrap().is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let store = ready_store(storage).await;
    assert_eq!(store.products().unwrap().len(), 1);
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let storage = MemoryStore::new();
    let staging = CartConfig {
        namespace: "@Staging".to_string(),
        ..CartConfig::default()
    };

    let default_store = ready_store(storage.clone()).await;
    default_store.add_to_cart(shirt()).await.unwrap();
    default_store.flush().await.unwrap();

    let staging_store = CartStore::new(storage.clone(), &staging);
    staging_store.activate();
    staging_store.ready().await.unwrap();

    assert!(staging_store.products().unwrap().is_empty());
    assert!(storage.get("@Staging:products").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fractional_prices_survive_restart() {
    let storage = MemoryStore::new();
    let mut mug = shirt();
    mug.id = ProductId::new("p3");
    mug.price = Decimal::new(1999, 2);

    {
        let store = ready_store(storage.clone()).await;
        store.add_to_cart(mug).await.unwrap();
        store.flush().await.unwrap();
    }

    let store = ready_store(storage).await;
    let products = store.products().unwrap();
    assert_eq!(products[0].price, Decimal::new(1999, 2));
}
