use super::models::RevealState;
use super::stats::PredictionStats;
use std::sync::Arc;

/// Short-lived cache for the views every visitor reads.
///
/// The cache is a hint, never authoritative: misses and failures fall
/// through to the store, and every write path invalidates what it touched.
#[async_trait::async_trait]
pub trait ViewCache: Send + Sync {
    // ---
    async fn reveal_state(&self) -> Option<RevealState>;

    async fn put_reveal_state(&self, state: &RevealState);

    async fn stats(&self) -> Option<PredictionStats>;

    async fn put_stats(&self, stats: &PredictionStats);

    /// Drop the cached reveal state after an admin save.
    async fn invalidate_reveal_state(&self);

    /// Drop the cached statistics after a prediction is added or removed.
    async fn invalidate_stats(&self);

    /// Connectivity probe for `/health?mode=full`.
    async fn ping(&self) -> anyhow::Result<()>;
}

pub type ViewCachePtr = Arc<dyn ViewCache>;
