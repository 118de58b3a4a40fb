//! CLI subcommand implementations.

pub mod migrate;
pub mod stale;

use store_locator::config::{ConfigError, LocatorConfig};
use thiserror::Error;

/// Errors shared by the database-backed commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] store_locator::db::RepositoryError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect to the locator database using the server's configuration.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let config = LocatorConfig::from_env()?;
    if config.database.is_tls_relaxed() {
        tracing::warn!(
            ssl_mode = ?config.database.ssl_mode,
            "Database TLS certificate verification is disabled"
        );
    }
    Ok(store_locator::db::create_pool(&config.database).await?)
}
