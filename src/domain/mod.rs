mod cache;
mod countdown;
mod errors;
mod identity;
mod metrics;
mod models;
mod orchestrator;
mod repository;
mod stats;

// Publicly expose the Metrics and cache abstractions
pub use cache::{ViewCache, ViewCachePtr};
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the reveal domain
pub use countdown::Countdown;
pub use errors::{BoxError, StoreError, StoreResult};
pub use identity::{IdentityStore, MemoryIdentity};
pub use models::{
    is_valid_email, normalize_email, normalize_registry_url, parse_countdown_date, FieldErrors,
    Guess, NewPrediction, NewRegistry, Prediction, Registry, RevealState, RevealUpdate,
};
pub use orchestrator::{decide_view, RevealOrchestrator, View};
pub use repository::{
    AdminVerifier, AdminVerifierPtr, PredictionStore, PredictionStorePtr, RegistryStore,
    RegistryStorePtr, RevealStateStore, RevealStateStorePtr,
};
pub use stats::{PredictionStats, Standing};
