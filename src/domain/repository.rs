use super::errors::StoreResult;
use super::models::{NewPrediction, NewRegistry, Prediction, Registry, RevealState, RevealUpdate};
use std::sync::Arc;
use uuid::Uuid;

/// Prediction persistence. There is deliberately no update operation.
#[async_trait::async_trait]
pub trait PredictionStore: Send + Sync {
    // ---
    /// Look up a prediction by email. The email is normalized before the query.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Prediction>>;

    /// Insert a validated prediction. Fails with `DuplicateEmail` on a unique violation.
    async fn create(&self, prediction: &NewPrediction) -> StoreResult<Prediction>;

    /// All predictions, newest first.
    async fn list(&self) -> StoreResult<Vec<Prediction>>;

    /// Hard delete. Deleting an unknown id is not an error.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()>;
}

/// Access to the reveal singleton row.
#[async_trait::async_trait]
pub trait RevealStateStore: Send + Sync {
    // ---
    /// Read the singleton. A missing row is `NotConfigured`, never "empty".
    async fn read(&self) -> StoreResult<RevealState>;

    /// Fetch the singleton id, then update that row and return it.
    async fn update(&self, update: &RevealUpdate) -> StoreResult<RevealState>;
}

/// Gift registry links.
#[async_trait::async_trait]
pub trait RegistryStore: Send + Sync {
    // ---
    /// All registries ordered by creation time, oldest first.
    async fn list(&self) -> StoreResult<Vec<Registry>>;

    async fn add(&self, registry: &NewRegistry) -> StoreResult<()>;

    async fn remove(&self, id: Uuid) -> StoreResult<()>;
}

/// The external password check. The gate never sees the stored secret.
#[async_trait::async_trait]
pub trait AdminVerifier: Send + Sync {
    // ---
    async fn verify(&self, password: &str) -> StoreResult<bool>;
}

pub type PredictionStorePtr = Arc<dyn PredictionStore>;
pub type RevealStateStorePtr = Arc<dyn RevealStateStore>;
pub type RegistryStorePtr = Arc<dyn RegistryStore>;
pub type AdminVerifierPtr = Arc<dyn AdminVerifier>;
