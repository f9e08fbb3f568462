//! In-memory gateways for unit tests.
//!
//! Mirrors the Postgres contract: unique normalized email, creation-ordered
//! registries, fetch-then-update on the reveal singleton. The view cache
//! mirrors Redis minus the TTL.

use crate::domain::{
    normalize_email, AdminVerifier, NewPrediction, NewRegistry, Prediction, PredictionStats,
    PredictionStore, Registry, RegistryStore, RevealState, RevealStateStore, RevealUpdate,
    StoreError, StoreResult, ViewCache,
};
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub const TEST_ADMIN_PASSWORD: &str = "let-me-in";

pub fn sample_reveal_state() -> RevealState {
    // ---
    RevealState {
        id: Uuid::new_v4(),
        countdown_date: Utc.with_ymd_and_hms(2030, 3, 24, 0, 0, 0).unwrap(),
        gender: None,
        is_revealed: false,
        updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub struct InMemoryStore {
    predictions: Mutex<Vec<Prediction>>,
    reveal: Mutex<Option<RevealState>>,
    registries: Mutex<Vec<Registry>>,
    fail_reads: AtomicBool,
    fail_reveal_fetch: AtomicBool,
    fail_reveal_save: AtomicBool,
    fail_verify: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        // ---
        Self {
            predictions: Mutex::new(Vec::new()),
            reveal: Mutex::new(Some(sample_reveal_state())),
            registries: Mutex::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
            fail_reveal_fetch: AtomicBool::new(false),
            fail_reveal_save: AtomicBool::new(false),
            fail_verify: AtomicBool::new(false),
        }
    }
}

impl InMemoryStore {
    // ---
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reveal_fetch(&self, fail: bool) {
        self.fail_reveal_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reveal_save(&self, fail: bool) {
        self.fail_reveal_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_verify(&self, fail: bool) {
        self.fail_verify.store(fail, Ordering::SeqCst);
    }

    pub fn remove_reveal_row(&self) {
        *self.reveal.lock().unwrap() = None;
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions.lock().unwrap().len()
    }

    fn check_reads(&self) -> StoreResult<()> {
        // ---
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store offline"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PredictionStore for InMemoryStore {
    // ---
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Prediction>> {
        // ---
        self.check_reads()?;
        let email = normalize_email(email);

        Ok(self
            .predictions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn create(&self, prediction: &NewPrediction) -> StoreResult<Prediction> {
        // ---
        let mut rows = self.predictions.lock().unwrap();
        if rows.iter().any(|p| p.email == prediction.email()) {
            return Err(StoreError::DuplicateEmail);
        }

        // Strictly increasing timestamps keep ordering deterministic.
        let created_at = Utc::now() + Duration::milliseconds(rows.len() as i64);
        let row = Prediction {
            id: Uuid::new_v4(),
            name: prediction.name().to_string(),
            email: prediction.email().to_string(),
            prediction: prediction.guess(),
            created_at,
        };
        rows.push(row.clone());

        Ok(row)
    }

    async fn list(&self) -> StoreResult<Vec<Prediction>> {
        // ---
        self.check_reads()?;
        let mut rows = self.predictions.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        // ---
        self.predictions.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl RevealStateStore for InMemoryStore {
    // ---
    async fn read(&self) -> StoreResult<RevealState> {
        // ---
        self.check_reads()?;
        self.reveal
            .lock()
            .unwrap()
            .clone()
            .ok_or(StoreError::NotConfigured)
    }

    async fn update(&self, update: &RevealUpdate) -> StoreResult<RevealState> {
        // ---
        if self.fail_reveal_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::FetchSettings("singleton fetch failed".into()));
        }

        let mut guard = self.reveal.lock().unwrap();
        let current = guard
            .as_ref()
            .ok_or_else(|| StoreError::FetchSettings("no reveal_state row".into()))?;

        if self.fail_reveal_save.load(Ordering::SeqCst) {
            return Err(StoreError::SaveSettings("update rejected".into()));
        }

        let updated = RevealState {
            id: current.id,
            countdown_date: update.countdown_date,
            gender: update.gender,
            is_revealed: update.is_revealed,
            updated_at: Utc::now(),
        };
        *guard = Some(updated.clone());

        Ok(updated)
    }
}

#[async_trait::async_trait]
impl RegistryStore for InMemoryStore {
    // ---
    async fn list(&self) -> StoreResult<Vec<Registry>> {
        // ---
        self.check_reads()?;
        Ok(self.registries.lock().unwrap().clone())
    }

    async fn add(&self, registry: &NewRegistry) -> StoreResult<()> {
        // ---
        self.registries.lock().unwrap().push(Registry {
            id: Uuid::new_v4(),
            name: registry.name().to_string(),
            url: registry.url().to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> StoreResult<()> {
        // ---
        self.registries.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AdminVerifier for InMemoryStore {
    // ---
    async fn verify(&self, password: &str) -> StoreResult<bool> {
        // ---
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("verification procedure offline"));
        }
        Ok(password == TEST_ADMIN_PASSWORD)
    }
}

#[derive(Default)]
pub struct InMemoryViewCache {
    reveal: Mutex<Option<RevealState>>,
    stats: Mutex<Option<PredictionStats>>,
    offline: AtomicBool,
}

impl InMemoryViewCache {
    // ---
    /// Behave like an unreachable Redis: every read misses, writes are lost.
    pub fn go_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn cached_reveal_state(&self) -> Option<RevealState> {
        self.reveal.lock().unwrap().clone()
    }

    pub fn cached_stats(&self) -> Option<PredictionStats> {
        *self.stats.lock().unwrap()
    }

    fn online(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ViewCache for InMemoryViewCache {
    // ---
    async fn reveal_state(&self) -> Option<RevealState> {
        self.online().then(|| self.cached_reveal_state()).flatten()
    }

    async fn put_reveal_state(&self, state: &RevealState) {
        if self.online() {
            *self.reveal.lock().unwrap() = Some(state.clone());
        }
    }

    async fn stats(&self) -> Option<PredictionStats> {
        self.online().then(|| self.cached_stats()).flatten()
    }

    async fn put_stats(&self, stats: &PredictionStats) {
        if self.online() {
            *self.stats.lock().unwrap() = Some(*stats);
        }
    }

    async fn invalidate_reveal_state(&self) {
        *self.reveal.lock().unwrap() = None;
    }

    async fn invalidate_stats(&self) {
        *self.stats.lock().unwrap() = None;
    }

    async fn ping(&self) -> anyhow::Result<()> {
        // ---
        if self.online() {
            Ok(())
        } else {
            anyhow::bail!("in-memory cache offline")
        }
    }
}
