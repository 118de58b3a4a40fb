//! Locator configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LOCATOR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `LOCATOR_HOST` - Bind address (default: 127.0.0.1)
//! - `LOCATOR_PORT` - Listen port (default: 3000)
//! - `LOCATOR_DB_SSL_MODE` - `disable`, `allow`, `prefer`, `require`, `verify-ca`
//!   or `verify-full` (default: verify-full). Overrides any `sslmode` in the URL.
//! - `LOCATOR_DB_SSL_ROOT_CERT` - CA bundle used to verify the database server
//! - `LOCATOR_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `LOCATOR_DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use sqlx::postgres::PgSslMode;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Locator application configuration.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (contains password)
    pub url: SecretString,
    /// TLS mode toward the database
    pub ssl_mode: PgSslMode,
    /// CA bundle for certificate verification
    pub ssl_root_cert: Option<PathBuf>,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Whether the TLS mode skips certificate verification.
    #[must_use]
    pub const fn is_tls_relaxed(&self) -> bool {
        !matches!(self.ssl_mode, PgSslMode::VerifyCa | PgSslMode::VerifyFull)
    }
}

impl LocatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parsed_or("LOCATOR_HOST", "127.0.0.1")?;
        let port = env.parsed_or("LOCATOR_PORT", "3000")?;

        Ok(Self {
            database: DatabaseConfig::from_env(&env)?,
            host,
            port,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DatabaseConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let url = env.database_url("LOCATOR_DATABASE_URL")?;
        let ssl_mode = env.parsed_or("LOCATOR_DB_SSL_MODE", "verify-full")?;
        let ssl_root_cert = env.optional("LOCATOR_DB_SSL_ROOT_CERT").map(PathBuf::from);
        let max_connections: u32 = env.parsed_or("LOCATOR_DB_MAX_CONNECTIONS", "10")?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LOCATOR_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let acquire_timeout_secs: u64 = env.parsed_or("LOCATOR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

        Ok(Self {
            url,
            ssl_mode,
            ssl_root_cert,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source used while loading configuration.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, falling back to a default when unset.
    fn parsed_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .as_deref()
            .unwrap_or(default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}
