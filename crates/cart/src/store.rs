//! The cart state container.
//!
//! [`CartStore`] owns the authoritative list of cart lines and mirrors it to
//! a [`KeyValueStore`] under a single key. Every mutation runs as one
//! transaction against the owned state:
//!
//! 1. take the state lock
//! 2. compute the next list from the current one
//! 3. write the serialized list to storage and wait for it
//! 4. commit the list in memory and publish it to subscribers
//!
//! The lock is held across the storage write, so two mutations issued back to
//! back always see each other's result. If the write fails, nothing is
//! committed and memory keeps matching storage.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use go_marketplace_core::{CartEntry, CartSummary, NewCartItem, ProductId, Quantity};

use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;

/// An immutable view of the cart's lines, in insertion order.
pub type CartSnapshot = Arc<[CartEntry]>;

#[derive(Debug, Default)]
struct CartState {
    entries: Vec<CartEntry>,
    loaded: bool,
}

/// Shopping cart mirrored to persistent storage.
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    state: Mutex<CartState>,
    published: watch::Sender<CartSnapshot>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("entries", &self.published.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty, not yet loaded cart persisted under `key`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (published, _) = watch::channel(CartSnapshot::from(Vec::new()));

        Self {
            storage,
            key: key.into(),
            state: Mutex::new(CartState::default()),
            published,
        }
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether [`CartStore::load`] has been attempted.
    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.loaded
    }

    /// Replace in-memory state with the persisted cart.
    ///
    /// If nothing is stored under the key, the in-memory cart is left as it
    /// is. Calling `load` again re-reads storage.
    ///
    /// A failed load still marks the cart loaded: it keeps its previous lines
    /// and accepts mutations, and the next write replaces the bad value.
    ///
    /// # Errors
    ///
    /// Returns `StorageRead` if the backend fails, `Decode` if the stored value
    /// is not a valid cart, or `DuplicateEntry` if it lists a product twice.
    /// In-memory state is unchanged on error.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> Result<CartSnapshot> {
        let mut state = self.state.lock().await;
        state.loaded = true;

        match self.read_stored().await {
            Ok(Some(entries)) => {
                info!(lines = entries.len(), "Loaded cart from storage");
                state.entries = entries;
            }
            Ok(None) => debug!("No stored cart, starting empty"),
            Err(e) => {
                error!(error = %e, "Failed to load cart, keeping current lines");
                return Err(e);
            }
        }

        Ok(self.publish(&state.entries))
    }

    /// Add one unit of `item` to the cart.
    ///
    /// A product already in the cart has its quantity incremented; otherwise a
    /// new line with quantity 1 is appended.
    ///
    /// # Errors
    ///
    /// Returns `Usage` before [`CartStore::load`], `StorageWrite` if the
    /// cart cannot be persisted.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add(&self, item: NewCartItem) -> Result<CartSnapshot> {
        let mut state = self.lock_loaded().await?;

        if state.entries.iter().any(|entry| entry.id == item.id) {
            debug!("Product already in cart, incrementing");
            return self
                .update_quantity(&mut state, &item.id, Quantity::increment)
                .await;
        }

        let mut next = state.entries.clone();
        next.push(item.into_entry());
        self.commit(&mut state, next).await
    }

    /// Increase the quantity of product `id` by one.
    ///
    /// An unknown `id` leaves the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Usage` before [`CartStore::load`], `StorageWrite` if the
    /// cart cannot be persisted.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn increment(&self, id: &ProductId) -> Result<CartSnapshot> {
        let mut state = self.lock_loaded().await?;
        self.update_quantity(&mut state, id, Quantity::increment)
            .await
    }

    /// Decrease the quantity of product `id` by one, stopping at 1.
    ///
    /// The line is never removed. An unknown `id` leaves the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Usage` before [`CartStore::load`], `StorageWrite` if the
    /// cart cannot be persisted.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> Result<CartSnapshot> {
        let mut state = self.lock_loaded().await?;
        self.update_quantity(&mut state, id, Quantity::decrement)
            .await
    }

    /// The current cart lines.
    #[must_use]
    pub fn current(&self) -> CartSnapshot {
        self.published.borrow().clone()
    }

    /// Item count and subtotal of the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_entries(&self.current())
    }

    /// Watch the cart. The receiver sees every committed state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.published.subscribe()
    }

    async fn read_stored(&self) -> Result<Option<Vec<CartEntry>>> {
        let Some(raw) = self
            .storage
            .get(&self.key)
            .await
            .map_err(CartError::StorageRead)?
        else {
            return Ok(None);
        };

        let entries: Vec<CartEntry> = serde_json::from_str(&raw).map_err(CartError::Decode)?;
        ensure_unique(&entries)?;
        Ok(Some(entries))
    }

    async fn lock_loaded(&self) -> Result<tokio::sync::MutexGuard<'_, CartState>> {
        let state = self.state.lock().await;
        if !state.loaded {
            return Err(CartError::Usage("cart mutated before it was loaded"));
        }
        Ok(state)
    }

    async fn update_quantity(
        &self,
        state: &mut CartState,
        id: &ProductId,
        step: fn(Quantity) -> Quantity,
    ) -> Result<CartSnapshot> {
        let mut next = state.entries.clone();

        match next.iter_mut().find(|entry| entry.id == *id) {
            Some(entry) => entry.quantity = step(entry.quantity),
            None => warn!("Product not in cart, quantity unchanged"),
        }

        self.commit(state, next).await
    }

    async fn commit(&self, state: &mut CartState, next: Vec<CartEntry>) -> Result<CartSnapshot> {
        let raw = serde_json::to_string(&next).map_err(CartError::Encode)?;

        self.storage
            .set(&self.key, raw)
            .await
            .map_err(CartError::StorageWrite)?;
        debug!(lines = next.len(), "Persisted cart");

        state.entries = next;
        Ok(self.publish(&state.entries))
    }

    fn publish(&self, entries: &[CartEntry]) -> CartSnapshot {
        let snapshot = CartSnapshot::from(entries);
        self.published.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

fn ensure_unique(entries: &[CartEntry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(&entry.id) {
            return Err(CartError::DuplicateEntry(entry.id.clone()));
        }
    }
    Ok(())
}
