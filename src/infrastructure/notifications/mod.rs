//! Push channel for reveal-state changes.
//!
//! A database trigger publishes every `reveal_state` row change on the
//! `reveal_state_changes` channel. One listener task per process writes
//! each row through to the view cache and forwards it into a broadcast hub;
//! each SSE connection subscribes to the hub.

use crate::domain::{MetricsPtr, RevealState, ViewCachePtr};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgListener, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Postgres NOTIFY channel written by the `reveal_state` trigger.
pub const REVEAL_CHANNEL: &str = "reveal_state_changes";

/// Slow subscribers that fall this far behind skip to the newest event.
const HUB_CAPACITY: usize = 64;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Fan-out point for reveal-state events within this process.
///
/// Also remembers the newest `updated_at` it has published, so readers that
/// raced a save can tell their row is already superseded.
#[derive(Clone)]
pub struct RevealHub {
    sender: broadcast::Sender<RevealState>,
    latest: Arc<watch::Sender<Option<DateTime<Utc>>>>,
}

impl Default for RevealHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealHub {
    // ---
    pub fn new() -> Self {
        // ---
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        let (latest, _) = watch::channel(None);
        Self {
            sender,
            latest: Arc::new(latest),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RevealState> {
        self.sender.subscribe()
    }

    /// `true` when a newer row than `state` has already been published.
    pub fn is_superseded(&self, state: &RevealState) -> bool {
        let latest = *self.latest.borrow();
        latest.is_some_and(|latest| state.updated_at < latest)
    }

    /// Deliver a new reveal state to every open subscriber.
    pub fn publish(&self, state: RevealState) {
        // ---
        let updated_at = state.updated_at;
        self.latest.send_if_modified(|latest| {
            let newer = !matches!(*latest, Some(seen) if seen >= updated_at);
            if newer {
                *latest = Some(updated_at);
            }
            newer
        });

        // No subscribers is the common case between page views.
        let receivers = self.sender.send(state).unwrap_or(0);
        tracing::debug!("Published reveal state to {receivers} subscriber(s)");
    }
}

/// Parse one NOTIFY payload (the new row as JSON).
pub fn parse_reveal_payload(payload: &str) -> serde_json::Result<RevealState> {
    serde_json::from_str(payload)
}

/// Spawns the background task that bridges Postgres NOTIFY into `hub`.
///
/// The task reconnects with exponential backoff whenever the listener
/// connection drops, and runs for the life of the process.
pub fn spawn_reveal_listener(
    pool: PgPool,
    hub: RevealHub,
    cache: ViewCachePtr,
    metrics: MetricsPtr,
) -> tokio::task::JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let mut backoff = Duration::from_millis(500);

        loop {
            match listen(&pool, &hub, &cache, &metrics).await {
                Ok(()) => backoff = Duration::from_millis(500),
                Err(err) => {
                    tracing::error!("Reveal listener failed, retrying in {backoff:?}: {err}");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    })
}

async fn listen(
    pool: &PgPool,
    hub: &RevealHub,
    cache: &ViewCachePtr,
    metrics: &MetricsPtr,
) -> Result<(), sqlx::Error> {
    // ---
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(REVEAL_CHANNEL).await?;
    tracing::info!("Listening for reveal state changes on '{REVEAL_CHANNEL}'");

    loop {
        let notification = listener.recv().await?;
        deliver(notification.payload(), hub, cache, metrics).await;
    }
}

/// Handles one NOTIFY payload: refresh the cached row, then fan out.
///
/// Saves made by other processes only reach this one through here, so the
/// cache write must not be skipped.
async fn deliver(payload: &str, hub: &RevealHub, cache: &ViewCachePtr, metrics: &MetricsPtr) {
    // ---
    match parse_reveal_payload(payload) {
        Ok(state) => {
            metrics.record_reveal_event();
            if !hub.is_superseded(&state) {
                cache.put_reveal_state(&state).await;
            }
            hub.publish(state);
        }
        Err(err) => {
            tracing::warn!("Ignoring malformed reveal notification: {err}");
        }
    }
}
