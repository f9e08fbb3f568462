use crate::domain::{PredictionStats, RevealState, ViewCache};

/// Always misses. Used when `REVEAL_CACHE=none` and in tests.
pub struct NoopViewCache;

#[async_trait::async_trait]
impl ViewCache for NoopViewCache {
    // ---
    async fn reveal_state(&self) -> Option<RevealState> {
        None
    }
    async fn put_reveal_state(&self, _: &RevealState) {}
    async fn stats(&self) -> Option<PredictionStats> {
        None
    }
    async fn put_stats(&self, _: &PredictionStats) {}
    async fn invalidate_reveal_state(&self) {}
    async fn invalidate_stats(&self) {}
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
