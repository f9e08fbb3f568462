mod noop_cache;
mod redis_cache;

pub use noop_cache::NoopViewCache;
pub use redis_cache::RedisViewCache;

use crate::config::RedisConfig;
use std::sync::Arc;

/// Creates a Redis-backed view cache.
///
/// The client is created eagerly but connects lazily, so a Redis outage at
/// startup degrades to cache misses instead of failing the boot.
pub fn create_redis_cache(config: &RedisConfig) -> anyhow::Result<crate::domain::ViewCachePtr> {
    // ---
    tracing::info!("Initializing Redis view cache (ttl {:?})", config.view_cache_ttl);
    let client = redis::Client::open(config.url.clone())?;

    Ok(Arc::new(RedisViewCache::new(client, config.view_cache_ttl)))
}

/// Creates a cache that never stores anything.
pub fn create_noop_cache() -> anyhow::Result<crate::domain::ViewCachePtr> {
    Ok(Arc::new(NoopViewCache))
}
