//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sl-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LOCATOR_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `LOCATOR_DB_SSL_MODE` - TLS mode, as for the server
//!
//! # Migration Files
//!
//! Locator migrations live in `crates/locator/migrations/` and are embedded
//! into the binary at compile time.

use super::{CommandError, connect};

/// Run locator database migrations.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database cannot be
/// reached, or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    tracing::info!("Connecting to locator database...");
    let pool = connect().await?;

    tracing::info!("Running locator migrations...");
    sqlx::migrate!("../locator/migrations").run(&pool).await?;

    tracing::info!("Locator migrations complete!");
    Ok(())
}
