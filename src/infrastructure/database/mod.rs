//! Postgres connection pool, migrations and the repository backing every
//! store gateway.

mod postgres_repository;
#[cfg(test)]
mod tests;

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub use postgres_repository::{create_postgres_repository, PostgresRepository};

/// Delay between connection attempts while the database comes up.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Connects to Postgres, retrying until `retry_count` attempts are spent,
/// then applies the embedded migrations.
///
/// The migrations create the tables, the unique email constraint, the
/// password procedure, the notify trigger, and seed the reveal singleton.
pub async fn init_database_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let options = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout);

    let mut attempt = 0;
    let pool = loop {
        attempt += 1;
        match options.clone().connect(&config.database_url).await {
            Ok(pool) => break pool,
            Err(err) if attempt < config.retry_count => {
                tracing::warn!(
                    "Database not ready (attempt {attempt}/{}): {err}",
                    config.retry_count
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                return Err(err).context(format!(
                    "failed to connect to database after {attempt} attempts"
                ));
            }
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    tracing::info!("Database ready after {attempt} attempt(s)");

    Ok(pool)
}

/// Same as [`init_database_with_retry`], with configuration read from the environment.
pub async fn init_database_with_retry_from_env() -> Result<PgPool> {
    // ---
    let config = DatabaseConfig::from_env()?;
    init_database_with_retry(&config).await
}
