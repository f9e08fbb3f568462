//! Application state management.
//!
//! This module defines the shared state passed to every Axum handler via the
//! `State` extractor: the store gateways, the view cache, metrics, the
//! reveal push hub, and cookie policy. Everything heavy sits behind an `Arc`
//! so the struct clones cheaply per request.

use crate::domain::{
    AdminVerifierPtr, MetricsPtr, PredictionStats, PredictionStorePtr, RegistryStorePtr,
    RevealState, RevealStateStorePtr, StoreResult, ViewCachePtr,
};
use crate::infrastructure::RevealHub;
use crate::session::CookiePolicy;

/// Shared application state passed to all Axum handlers.
///
/// This struct is the dependency injection container for the service.
/// Handlers depend on the gateway traits, never on `PostgresRepository`,
/// which is what lets the unit tests swap in in-memory stores.
///
/// # Lifecycle
///
/// 1. Created once in `create_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
#[derive(Clone)]
pub struct AppState {
    /// Guest predictions: lookup, create, list, delete.
    predictions: PredictionStorePtr,

    /// The reveal singleton: read and two-step update.
    reveal_state: RevealStateStorePtr,

    /// Gift registry links.
    registries: RegistryStorePtr,

    /// External password procedure behind the admin gate.
    admin_verifier: AdminVerifierPtr,

    /// Short-lived cache for the reveal state and statistics.
    cache: ViewCachePtr,

    /// Metrics implementation (Prometheus or no-op).
    metrics: MetricsPtr,

    /// In-process fan-out of reveal-state changes to SSE subscribers.
    hub: RevealHub,

    /// Cookie attributes (`Secure` in production).
    cookies: CookiePolicy,
}

impl AppState {
    // ---

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        predictions: PredictionStorePtr,
        reveal_state: RevealStateStorePtr,
        registries: RegistryStorePtr,
        admin_verifier: AdminVerifierPtr,
        cache: ViewCachePtr,
        metrics: MetricsPtr,
        hub: RevealHub,
        cookies: CookiePolicy,
    ) -> Self {
        // ---
        AppState {
            predictions,
            reveal_state,
            registries,
            admin_verifier,
            cache,
            metrics,
            hub,
            cookies,
        }
    }

    pub fn predictions(&self) -> &PredictionStorePtr {
        &self.predictions
    }

    pub fn reveal_state_store(&self) -> &RevealStateStorePtr {
        &self.reveal_state
    }

    pub fn registries(&self) -> &RegistryStorePtr {
        &self.registries
    }

    pub fn admin_verifier(&self) -> &AdminVerifierPtr {
        &self.admin_verifier
    }

    pub fn cache(&self) -> &ViewCachePtr {
        &self.cache
    }

    pub fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }

    pub fn hub(&self) -> &RevealHub {
        &self.hub
    }

    pub fn cookies(&self) -> CookiePolicy {
        self.cookies
    }

    /// Current reveal state, served from cache when possible.
    ///
    /// Only for display. Decisions that depend on the reveal flag read the
    /// store directly.
    pub async fn current_reveal_state(&self) -> StoreResult<RevealState> {
        // ---
        if let Some(cached) = self.cache.reveal_state().await {
            return Ok(cached);
        }

        let state = self.reveal_state.read().await?;

        // A save that landed while we were reading has already written its
        // row through; don't overwrite it with ours.
        if !self.hub.is_superseded(&state) {
            self.cache.put_reveal_state(&state).await;
        }

        Ok(state)
    }

    /// Aggregate statistics, recomputed from every prediction on a cache miss.
    pub async fn current_stats(&self) -> StoreResult<PredictionStats> {
        // ---
        if let Some(cached) = self.cache.stats().await {
            return Ok(cached);
        }

        let predictions = self.predictions.list().await?;
        let stats = PredictionStats::compute(predictions.iter().map(|p| p.prediction));
        self.cache.put_stats(&stats).await;

        Ok(stats)
    }
}
