// src/lib.rs
use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use handlers::*;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod session;

#[cfg(test)]
mod test_support;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use session::{CookiePolicy, ADMIN_COOKIE, GUEST_COOKIE};

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_cache, // ---
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    create_redis_cache,
    init_database_with_retry,
    init_database_with_retry_from_env,
    spawn_reveal_listener,
    PostgresRepository,
    RevealHub,
};

/// Build the HTTP router over an already-assembled [`AppState`].
pub fn build_router(app_state: AppState) -> Router {
    // ---
    let guest = Router::new()
        .route("/view", get(get_view))
        .route("/predictions", post(submit_prediction))
        .route("/predictions/find", post(find_prediction))
        .route("/stats", get(get_stats))
        .route("/reveal", get(get_reveal))
        .route("/reveal/events", get(reveal_events))
        .route("/registries", get(list_registries));

    // Only the routes above `route_layer` are gated; login and logout stay open.
    let admin = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/reveal", put(update_reveal))
        .route("/predictions/{id}", delete(delete_prediction))
        .route("/registries", post(add_registry))
        .route("/registries/{id}", delete(remove_registry))
        .route_layer(middleware::from_fn(require_admin))
        .route("/login", post(login))
        .route("/logout", post(logout));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api", guest)
        .nest("/admin", admin)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_requests,
        ))
        .with_state(app_state)
}

/// Build the HTTP router with every dependency wired from environment variables.
///
/// Connects to Postgres (running migrations), sets up the view cache and
/// metrics backend, and starts the background task that forwards reveal
/// notifications to open event streams.
pub async fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    let metrics = if config.server.prometheus_metrics {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    // Create infrastructure dependencies
    let pool = init_database_with_retry(&config.database).await?;
    let repository = Arc::new(create_postgres_repository(pool.clone()));

    let cache = if config.redis.enabled {
        create_redis_cache(&config.redis)?
    } else {
        tracing::info!("View cache disabled, reads go straight to Postgres");
        create_noop_cache()?
    };

    let hub = RevealHub::new();
    spawn_reveal_listener(pool, hub.clone(), cache.clone(), metrics.clone());

    // Build application state with all dependencies
    let app_state = AppState::new(
        repository.clone(),
        repository.clone(),
        repository.clone(),
        repository,
        cache,
        metrics,
        hub,
        CookiePolicy {
            secure: config.server.production,
        },
    );

    Ok(build_router(app_state))
}
