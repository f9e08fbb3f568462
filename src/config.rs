// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// Fails fast with a readable message naming the missing key.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub redis: redis::RedisConfig,
    pub server: server::ServerConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            redis: redis::RedisConfig::from_env()?,
            server: server::ServerConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Postgres connection settings. Required for the service to start.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of connection attempts before startup gives up. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections open concurrently. Defaults to 15
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `DATABASE_URL` is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("REVEAL_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("REVEAL_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("REVEAL_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("REVEAL_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Redis configuration
// ============================================================

mod redis {
    // ---
    use super::*;

    /// Redis settings for the view cache.
    ///
    /// The cached reveal state and statistics live for `view_cache_ttl`
    /// unless an admin write invalidates them first.
    #[derive(Debug, Clone)]
    pub struct RedisConfig {
        /// Redis connection string.
        pub url: String,

        /// Time-to-live for cached views. Defaults to 30 seconds.
        pub view_cache_ttl: Duration,

        /// `false` when `REVEAL_CACHE=none`; views then always hit the store.
        pub enabled: bool,
    }

    impl RedisConfig {
        /// Builds a [`RedisConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `REVEAL_REDIS_URL` is missing while caching is enabled.
        pub fn from_env() -> Result<Self> {
            // ---
            let enabled = std::env::var("REVEAL_CACHE")
                .map(|v| !v.eq_ignore_ascii_case("none"))
                .unwrap_or(true);

            let url = if enabled {
                required_env!("REVEAL_REDIS_URL")
            } else {
                std::env::var("REVEAL_REDIS_URL").unwrap_or_default()
            };

            let ttl_secs = optional_env_parse!("REVEAL_CACHE_TTL_SEC", u64, 30);

            Ok(Self {
                url,
                view_cache_ttl: Duration::from_secs(ttl_secs),
                enabled,
            })
        }
    }
}
pub use redis::RedisConfig;

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// HTTP-facing settings.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Listen address. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,

        /// `true` when `REVEAL_ENV=production`; cookies then carry `Secure`.
        pub production: bool,

        /// `true` when `REVEAL_METRICS_TYPE=prom`.
        pub prometheus_metrics: bool,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables. Nothing here is required.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr = std::env::var("REVEAL_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

            let production = std::env::var("REVEAL_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false);

            let prometheus_metrics = std::env::var("REVEAL_METRICS_TYPE")
                .map(|v| v == "prom")
                .unwrap_or(false);

            Ok(Self {
                bind_addr,
                production,
                prometheus_metrics,
            })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Tests
// ============================================================
