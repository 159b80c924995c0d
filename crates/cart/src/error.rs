//! Error types for the cart and its storage backends.

use thiserror::Error;

use go_marketplace_core::ProductId;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration failed.
    #[cfg(feature = "postgres")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The configured backend is not available in this build.
    #[error("Unsupported storage backend: {0}")]
    Unsupported(String),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Reading the persisted cart failed.
    #[error("Failed to read cart from storage: {0}")]
    StorageRead(#[source] StorageError),

    /// Writing the cart to storage failed. In-memory state is left unchanged.
    #[error("Failed to write cart to storage: {0}")]
    StorageWrite(#[source] StorageError),

    /// The persisted cart could not be parsed.
    #[error("Stored cart is malformed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The persisted cart lists the same product twice.
    #[error("Stored cart contains duplicate product {0}")]
    DuplicateEntry(ProductId),

    /// The cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The cart was used outside of its initialized scope.
    #[error("Cart usage error: {0}")]
    Usage(&'static str),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::Usage("cart accessed before initialization");
        assert_eq!(
            err.to_string(),
            "Cart usage error: cart accessed before initialization"
        );

        let err = CartError::StorageWrite(StorageError::Backend("disk full".to_string()));
        assert_eq!(
            err.to_string(),
            "Failed to write cart to storage: Storage backend error: disk full"
        );

        let err = CartError::DuplicateEntry(ProductId::new("p1"));
        assert_eq!(err.to_string(), "Stored cart contains duplicate product p1");
    }

    #[test]
    fn test_storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::from(io);
        assert!(matches!(err, StorageError::Io(_)));
    }
}
