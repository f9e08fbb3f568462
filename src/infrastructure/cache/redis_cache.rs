//! Redis-backed view cache.
//!
//! Values are JSON strings with a TTL. Every failure is logged and treated
//! as a miss; callers always have the store to fall back on.

use crate::domain::{PredictionStats, RevealState, ViewCache};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub(crate) const REVEAL_STATE_KEY: &str = "reveal:view:state";
pub(crate) const STATS_KEY: &str = "reveal:view:stats";

pub struct RedisViewCache {
    // ---
    client: Client,
    ttl: Duration,
}

impl RedisViewCache {
    // ---
    pub fn new(client: Client, ttl: Duration) -> Self {
        // ---
        Self { client, ttl }
    }

    async fn get_conn(&self) -> Option<MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| tracing::error!("Failed to connect to Redis: {:?}", err))
            .ok()
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        // ---
        let mut conn = self.get_conn().await?;
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|err| tracing::warn!("Redis GET {key} failed: {err}"))
            .ok()?;

        serde_json::from_str(&raw?)
            .map_err(|err| tracing::warn!("Discarding unreadable cache entry {key}: {err}"))
            .ok()
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) {
        // ---
        let Some(mut conn) = self.get_conn().await else {
            return;
        };
        let Ok(json) = serde_json::to_string(value) else {
            return;
        };

        if let Err(err) = conn
            .set_ex::<_, _, ()>(key, json, self.ttl.as_secs().max(1))
            .await
        {
            tracing::warn!("Redis SETEX {key} failed: {err}");
        }
    }

    async fn delete(&self, key: &str) {
        // ---
        let Some(mut conn) = self.get_conn().await else {
            return;
        };

        if let Err(err) = conn.del::<_, ()>(key).await {
            tracing::error!("Failed to invalidate {key}: {err}");
        }
    }
}

#[async_trait::async_trait]
impl ViewCache for RedisViewCache {
    // ---
    async fn reveal_state(&self) -> Option<RevealState> {
        self.get_json(REVEAL_STATE_KEY).await
    }

    async fn put_reveal_state(&self, state: &RevealState) {
        self.put_json(REVEAL_STATE_KEY, state).await
    }

    async fn stats(&self) -> Option<PredictionStats> {
        self.get_json(STATS_KEY).await
    }

    async fn put_stats(&self, stats: &PredictionStats) {
        self.put_json(STATS_KEY, stats).await
    }

    async fn invalidate_reveal_state(&self) {
        self.delete(REVEAL_STATE_KEY).await
    }

    async fn invalidate_stats(&self) {
        self.delete(STATS_KEY).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        // ---
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
