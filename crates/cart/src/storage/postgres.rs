//! `PostgreSQL` storage backend.
//!
//! # Table: `key_value_store`
//!
//! | column       | type          |
//! |--------------|---------------|
//! | `key`        | `TEXT` PK     |
//! | `value`      | `TEXT`        |
//! | `updated_at` | `TIMESTAMPTZ` |
//!
//! # Migrations
//!
//! Migrations are stored in `crates/cart/migrations/` and run via:
//! ```bash
//! cargo run -p go-marketplace-cli --features postgres -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info, instrument};

use super::KeyValueStore;
use crate::error::StorageError;

/// A [`KeyValueStore`] backed by the `key_value_store` table.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with sensible pool defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;

        Ok(Self::new(pool))
    }

    /// Run the bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Migration` if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        info!("Running cart storage migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Cart storage migrations complete");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM key_value_store WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await?;

        debug!(bytes = value.len(), "Upserted storage row");
        Ok(())
    }
}
