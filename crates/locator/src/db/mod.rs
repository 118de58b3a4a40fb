//! Database operations for the store locator `PostgreSQL`.
//!
//! ## Tables
//!
//! - `stores` - One row per store, unique on `customer_id`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/locator/migrations/` and run via:
//! ```bash
//! cargo run -p store-locator-cli -- migrate
//! ```
//!
//! Handlers never touch the pool directly: they go through the
//! [`StoreRepository`] trait so tests can swap in an in-memory store.

pub mod stores;

#[cfg(test)]
pub mod memory;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use store_locator_core::{GeoPoint, StaleThreshold, StoreRecord};

use crate::config::DatabaseConfig;

pub use stores::PgStoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Persistence contract shared by every handler.
///
/// Each method issues exactly one statement.
#[async_trait]
pub trait StoreRepository: Send + Sync + 'static {
    /// Insert the record, or overwrite every field of the existing record with
    /// the same `customer_id`, atomically.
    async fn upsert(&self, record: &StoreRecord) -> Result<(), RepositoryError>;

    /// Identifiers of records whose `order_date` is older than the threshold.
    ///
    /// Values are returned as stored: `NULL` or empty identifiers may appear
    /// and are filtered by the caller.
    async fn stale_customer_ids(
        &self,
        threshold: StaleThreshold,
    ) -> Result<Vec<Option<String>>, RepositoryError>;

    /// Up to `limit` records with a valid location, nearest to `origin` first.
    async fn nearest_stores(
        &self,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, RepositoryError>;

    /// Round-trip to the database for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<T: StoreRepository + ?Sized> StoreRepository for Arc<T> {
    async fn upsert(&self, record: &StoreRecord) -> Result<(), RepositoryError> {
        (**self).upsert(record).await
    }

    async fn stale_customer_ids(
        &self,
        threshold: StaleThreshold,
    ) -> Result<Vec<Option<String>>, RepositoryError> {
        (**self).stale_customer_ids(threshold).await
    }

    async fn nearest_stores(
        &self,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, RepositoryError> {
        (**self).nearest_stores(origin, limit).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        (**self).ping().await
    }
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// The configured TLS mode replaces any `sslmode` given in the URL.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let mut options =
        PgConnectOptions::from_str(config.url.expose_secret())?.ssl_mode(config.ssl_mode);
    if let Some(root_cert) = &config.ssl_root_cert {
        options = options.ssl_root_cert(root_cert);
    }

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.max_connections.min(2))
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
}
