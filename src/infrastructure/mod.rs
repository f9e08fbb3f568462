pub mod cache;
pub mod database;
pub mod metrics;
pub mod notifications;

// Re-export the factory functions for easy access
pub use cache::{create_noop_cache, create_redis_cache};
pub use database::{
    create_postgres_repository, init_database_with_retry, init_database_with_retry_from_env,
    PostgresRepository,
};
pub use metrics::{create_noop_metrics, create_prom_metrics};
pub use notifications::{spawn_reveal_listener, RevealHub};
