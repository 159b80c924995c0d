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
//! - `cart_scenarios` - Cart behaviour through the public API, per backend
//! - `cart_persistence` - What ends up in storage, and reading it back
//! - `global_provider` - The process-wide cart provider
//!
//! This library holds the fixtures shared by those tests.

use go_marketplace_cart::storage::KeyValueStore;
use go_marketplace_core::{CartEntry, NewCartItem, Price, ProductId};

/// Storage key used by every test cart.
pub const TEST_KEY: &str = "GoMarketplace:products";

/// A catalog item with a predictable title, image and price.
#[must_use]
pub fn sample_item(id: &str, cents: i64) -> NewCartItem {
    NewCartItem {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        image_url: format!("https://img.example/{id}.png"),
        price: Price::from_cents(cents),
    }
}

/// Decode whatever the cart last wrote to `storage`.
///
/// # Panics
///
/// Panics if nothing is stored under [`TEST_KEY`] or it is not a cart.
#[allow(clippy::unwrap_used)]
pub async fn persisted(storage: &dyn KeyValueStore) -> Vec<CartEntry> {
    let raw = storage
        .get(TEST_KEY)
        .await
        .unwrap()
        .expect("cart was never persisted");
    serde_json::from_str(&raw).unwrap()
}
