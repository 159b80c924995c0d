//! Go Marketplace Cart - persisted shopping-cart state container.
//!
//! Holds the cart's line items in memory, mirrors them to a key/value store
//! under a single key, and exposes add / increment / decrement to callers.
//!
//! # Architecture
//!
//! - [`store::CartStore`] - authoritative cart state; every mutation is
//!   persisted before it becomes visible
//! - [`storage`] - the [`storage::KeyValueStore`] contract and its backends
//! - [`provider`] - one shared cart for many callers, with fail-fast access
//!   before initialization
//! - [`config`] - environment-driven configuration
//!
//! # Example
//!
//! ```rust
//! # async fn demo() -> go_marketplace_cart::Result<()> {
//! use go_marketplace_cart::{CartConfig, CartProvider};
//! use go_marketplace_core::{NewCartItem, Price, ProductId};
//!
//! let provider = CartProvider::new();
//! let cart = provider.init(&CartConfig::in_memory()).await?;
//!
//! cart.add_to_cart(NewCartItem {
//!     id: ProductId::new("p1"),
//!     title: "Shirt".to_string(),
//!     image_url: "https://img.example/p1.png".to_string(),
//!     price: Price::from_cents(1000),
//! })
//! .await?;
//!
//! assert_eq!(cart.products()[0].quantity.get(), 1);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod provider;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY, StorageBackend};
pub use error::{CartError, Result, StorageError};
pub use provider::{CART, Cart, CartProvider, use_cart};
pub use store::{CartSnapshot, CartStore};
