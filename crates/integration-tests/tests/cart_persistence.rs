//! What the cart writes to storage, and reading it back.

use std::sync::Arc;

use go_marketplace_cart::storage::{FileStore, KeyValueStore, MemoryStore};
use go_marketplace_cart::{CartError, CartStore};
use go_marketplace_core::{CartEntry, Price, ProductId};
use go_marketplace_integration_tests::{TEST_KEY, persisted, sample_item};
use serde_json::Value;

const SHIRT: &str = r#"[{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":2}]"#;

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_load_then_query() {
    let store = CartStore::new(Arc::new(MemoryStore::seeded(TEST_KEY, SHIRT)), TEST_KEY);
    store.load().await.unwrap();

    let cart = store.current();
    assert_eq!(cart.len(), 1);
    let entry = &cart[0];
    assert_eq!(entry.id, ProductId::new("p1"));
    assert_eq!(entry.title, "Shirt");
    assert_eq!(entry.image_url, "u");
    assert_eq!(entry.price, Price::from_cents(1000));
    assert_eq!(entry.quantity.get(), 2);
}

#[tokio::test]
async fn test_load_camel_case_writer() {
    let json = r#"[{"id":"p1","title":"Shirt","imageUrl":"u","price":10,"quantity":2}]"#;
    let store = CartStore::new(Arc::new(MemoryStore::seeded(TEST_KEY, json)), TEST_KEY);
    store.load().await.unwrap();
    assert_eq!(store.current()[0].image_url, "u");
}

#[tokio::test]
async fn test_load_rejects_zero_quantity() {
    let json = r#"[{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":0}]"#;
    let store = CartStore::new(Arc::new(MemoryStore::seeded(TEST_KEY, json)), TEST_KEY);
    assert!(matches!(store.load().await, Err(CartError::Decode(_))));
    assert!(store.current().is_empty());
}

#[tokio::test]
async fn test_malformed_file_is_repaired_by_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    storage.set(TEST_KEY, "{not json".to_string()).await.unwrap();

    let store = CartStore::new(Arc::clone(&storage), TEST_KEY);
    assert!(matches!(store.load().await, Err(CartError::Decode(_))));
    assert!(store.current().is_empty());

    store.add(sample_item("p1", 1000)).await.unwrap();
    assert_eq!(persisted(storage.as_ref()).await, store.current().to_vec());

    let reopened = CartStore::new(Arc::new(FileStore::new(dir.path())), TEST_KEY);
    assert_eq!(reopened.load().await.unwrap().len(), 1);
}

// =============================================================================
// Writing
// =============================================================================

#[tokio::test]
async fn test_serialization_round_trip() {
    let (storage, store) = {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (Arc::clone(&storage), CartStore::new(storage, TEST_KEY))
    };
    store.load().await.unwrap();
    store.add(sample_item("b", 1234)).await.unwrap();
    store.add(sample_item("a", 50)).await.unwrap();
    store.add(sample_item("b", 1234)).await.unwrap();

    let written = persisted(storage.as_ref()).await;
    assert_eq!(written, store.current().to_vec());

    let raw = serde_json::to_string(&written).unwrap();
    let decoded: Vec<CartEntry> = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, written);
}

#[tokio::test]
async fn test_persisted_shape() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let store = CartStore::new(Arc::clone(&storage), TEST_KEY);
    store.load().await.unwrap();
    store.add(sample_item("p1", 1050)).await.unwrap();

    let raw = storage.get(TEST_KEY).await.unwrap().unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    let line = &value.as_array().unwrap()[0];

    assert_eq!(line["id"], "p1");
    assert_eq!(line["title"], "Product p1");
    assert_eq!(line["image_url"], "https://img.example/p1.png");
    assert_eq!(line["price"].as_f64(), Some(10.5));
    assert_eq!(line["quantity"], 1);
    assert_eq!(line.as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn test_high_precision_price_is_stable_across_writes() {
    let json = r#"[{"id":"p1","title":"Shirt","image_url":"u","price":123456789.123456789,"quantity":1}]"#;
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::seeded(TEST_KEY, json));
    let store = CartStore::new(Arc::clone(&storage), TEST_KEY);
    let price = store.load().await.unwrap()[0].price;
    assert_eq!(price, Price::parse("123456789.123456789").unwrap());

    let id = ProductId::new("p1");
    for _ in 0..3 {
        store.increment(&id).await.unwrap();
        store.decrement(&id).await.unwrap();
    }

    let raw = storage.get(TEST_KEY).await.unwrap().unwrap();
    assert!(raw.contains(r#""price":123456789.123456789"#));
    assert_eq!(persisted(storage.as_ref()).await[0].price, price);
}

// =============================================================================
// Durability
// =============================================================================

#[tokio::test]
async fn test_file_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = CartStore::new(Arc::new(FileStore::new(dir.path())), TEST_KEY);
        store.load().await.unwrap();
        store.add(sample_item("p1", 1000)).await.unwrap();
        store.add(sample_item("p2", 250)).await.unwrap();
        store.increment(&ProductId::new("p2")).await.unwrap();
    }

    let reopened = CartStore::new(Arc::new(FileStore::new(dir.path())), TEST_KEY);
    let cart = reopened.load().await.unwrap();

    assert_eq!(cart.len(), 2);
    assert_eq!(cart[0].id.as_str(), "p1");
    assert_eq!(cart[1].quantity.get(), 2);
    assert_eq!(reopened.summary().subtotal, Price::from_cents(1500));
}

#[tokio::test]
async fn test_carts_under_different_keys_are_independent() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let first = CartStore::new(Arc::clone(&storage), "GoMarketplace:first");
    let second = CartStore::new(Arc::clone(&storage), "GoMarketplace:second");
    first.load().await.unwrap();
    second.load().await.unwrap();

    first.add(sample_item("p1", 100)).await.unwrap();

    assert_eq!(first.current().len(), 1);
    assert!(second.current().is_empty());
    assert!(storage.get("GoMarketplace:second").await.unwrap().is_none());
}
