//! Persistent key/value storage the cart is mirrored to.
//!
//! The cart only ever needs two operations: read the raw value stored under
//! a key, and replace it. Backends implement [`KeyValueStore`]:
//!
//! - [`MemoryStore`] - process-local, used by tests and throwaway sessions
//! - [`FileStore`] - one file per key on local disk (device storage)
//! - `PgStore` - `key_value_store` table in `PostgreSQL` (`postgres` feature)

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{CartConfig, StorageBackend};
use crate::error::StorageError;

mod file;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// An asynchronous string key/value store.
///
/// Implementations must make a completed `set` visible to every later `get`
/// on the same key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Open the storage backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached, or if it was not
/// compiled into this build.
pub async fn open(config: &CartConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    info!(backend = %config.backend, "Opening cart storage");

    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::File => Ok(Arc::new(FileStore::new(&config.storage_dir))),
        StorageBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &CartConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let url = config
        .database_url
        .as_ref()
        .ok_or_else(|| StorageError::Backend("CART_DATABASE_URL not set".to_string()))?;

    Ok(Arc::new(PgStore::connect(url).await?))
}

#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
async fn open_postgres(_config: &CartConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    Err(StorageError::Unsupported(
        "postgres (rebuild with the `postgres` feature)".to_string(),
    ))
}
