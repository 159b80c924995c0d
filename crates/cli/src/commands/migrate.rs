//! Storage migration command.
//!
//! # Usage
//!
//! ```bash
//! CART_STORAGE_BACKEND=postgres gm-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations are stored in `crates/cart/migrations/`. Only the `postgres`
//! backend has a schema; `memory` and `file` need no migration.

use go_marketplace_cart::{CartConfig, StorageBackend, StorageError};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[cfg(feature = "postgres")]
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// This build cannot talk to the configured backend.
    #[cfg(not(feature = "postgres"))]
    #[error("Migrations need the postgres feature (rebuild with --features postgres)")]
    Unsupported,

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Run migrations for the configured backend.
///
/// # Errors
///
/// Returns an error if the database URL is missing, or a migration fails.
pub async fn run(config: &CartConfig) -> Result<(), MigrationError> {
    if config.backend != StorageBackend::Postgres {
        info!(backend = %config.backend, "Backend has no schema, nothing to migrate");
        return Ok(());
    }

    postgres(config).await
}

#[cfg(feature = "postgres")]
async fn postgres(config: &CartConfig) -> Result<(), MigrationError> {
    use go_marketplace_cart::storage::PgStore;

    let database_url = config
        .database_url
        .as_ref()
        .ok_or(MigrationError::MissingEnvVar("CART_DATABASE_URL"))?;

    info!("Connecting to cart database...");
    let store = PgStore::connect(database_url).await?;
    store.migrate().await?;
    Ok(())
}

#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
async fn postgres(_config: &CartConfig) -> Result<(), MigrationError> {
    Err(MigrationError::Unsupported)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_backend_needs_no_migration() {
        assert!(run(&CartConfig::default()).await.is_ok());
        assert!(run(&CartConfig::in_memory()).await.is_ok());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_postgres_without_feature() {
        let config = CartConfig {
            backend: StorageBackend::Postgres,
            ..CartConfig::default()
        };
        assert!(matches!(
            run(&config).await,
            Err(MigrationError::Unsupported)
        ));
    }
}
