//! Sharing one cart between many callers.
//!
//! A [`CartProvider`] is installed once with a loaded [`CartStore`] and then
//! hands out cheap [`Cart`] handles. Asking a provider for a cart before it
//! has been initialized is a programming error and returns
//! [`CartError::Usage`] instead of an empty cart.
//!
//! Most applications use the process-wide [`CART`] provider through
//! [`use_cart`]; tests and embedders can build their own provider.

use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tracing::{debug, info};

use go_marketplace_core::{CartSummary, NewCartItem, ProductId};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::storage;
use crate::store::{CartSnapshot, CartStore};

/// Process-wide cart provider.
pub static CART: CartProvider = CartProvider::new();

/// Get the process-wide cart.
///
/// # Errors
///
/// Returns [`CartError::Usage`] if [`CART`] has not been initialized.
pub fn use_cart() -> Result<Cart> {
    CART.cart()
}

/// Holder of a single, initialized cart.
#[derive(Debug, Default)]
pub struct CartProvider {
    cart: OnceLock<Cart>,
}

impl CartProvider {
    /// Create a provider with no cart installed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cart: OnceLock::new(),
        }
    }

    /// Open the configured storage, load the cart and install it.
    ///
    /// If a cart is already installed it is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorageRead` if storage cannot be opened or read, `Decode` if
    /// the persisted cart is malformed. Once storage is open the cart is
    /// installed even if loading it fails.
    pub async fn init(&self, config: &CartConfig) -> Result<Cart> {
        if let Some(cart) = self.cart.get() {
            return Ok(cart.clone());
        }

        let storage = storage::open(config)
            .await
            .map_err(CartError::StorageRead)?;

        self.install(CartStore::new(storage, config.storage_key.clone()))
            .await
    }

    /// Load `store` if needed and install it.
    ///
    /// If a cart is already installed, `store` is dropped and the installed
    /// cart is returned.
    ///
    /// # Errors
    ///
    /// Returns the error from [`CartStore::load`]. The store is installed
    /// anyway, keeping its previous (usually empty) lines.
    pub async fn install(&self, store: CartStore) -> Result<Cart> {
        let loaded = if store.is_loaded().await {
            Ok(())
        } else {
            store.load().await.map(drop)
        };

        let key = store.key().to_string();
        if self.cart.set(Cart::new(store)).is_err() {
            debug!(key = %key, "Cart already installed, keeping existing");
        } else {
            info!(key = %key, "Cart installed");
        }

        loaded?;
        self.cart()
    }

    /// Get the installed cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Usage`] if no cart has been installed.
    pub fn cart(&self) -> Result<Cart> {
        self.cart.get().cloned().ok_or(CartError::Usage(
            "cart accessed outside of an initialized CartProvider",
        ))
    }

    /// Whether a cart has been installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cart.get().is_some()
    }
}

/// Handle to a shared, loaded cart.
///
/// Cheaply cloneable via `Arc`.
#[derive(Debug, Clone)]
pub struct Cart {
    inner: Arc<CartStore>,
}

impl Cart {
    fn new(store: CartStore) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// The current cart lines.
    #[must_use]
    pub fn products(&self) -> CartSnapshot {
        self.inner.current()
    }

    /// Item count and subtotal.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.inner.summary()
    }

    /// Add one unit of `item`.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add`].
    pub async fn add_to_cart(&self, item: NewCartItem) -> Result<CartSnapshot> {
        self.inner.add(item).await
    }

    /// Increase the quantity of `id` by one.
    ///
    /// # Errors
    ///
    /// See [`CartStore::increment`].
    pub async fn increment(&self, id: &ProductId) -> Result<CartSnapshot> {
        self.inner.increment(id).await
    }

    /// Decrease the quantity of `id` by one, stopping at 1.
    ///
    /// # Errors
    ///
    /// See [`CartStore::decrement`].
    pub async fn decrement(&self, id: &ProductId) -> Result<CartSnapshot> {
        self.inner.decrement(id).await
    }

    /// Watch for cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.subscribe()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &CartStore {
        &self.inner
    }
}
