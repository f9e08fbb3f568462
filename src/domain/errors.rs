//! Failure taxonomy shared by every store gateway.
//!
//! Expected outcomes (a missing prediction, a duplicate email) never surface
//! as generic failures: "not found" is an `Option`, and a duplicate email is
//! its own variant so the caller can tell the guest to use
//! "find my prediction" instead of "try again".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    // ---
    /// The unique constraint on `predictions.email` rejected the insert.
    #[error("a prediction already exists for this email")]
    DuplicateEmail,

    /// Step one of the reveal update could not read the singleton row.
    #[error("failed to fetch current settings")]
    FetchSettings(#[source] BoxError),

    /// Step two of the reveal update failed or returned no row.
    #[error("failed to save changes")]
    SaveSettings(#[source] BoxError),

    /// The reveal singleton is missing. It must be seeded before startup.
    #[error("reveal state is not configured")]
    NotConfigured,

    /// Any other store or network failure.
    #[error("store unavailable")]
    Unavailable(#[source] BoxError),
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

impl StoreError {
    // ---
    pub fn unavailable(err: impl Into<BoxError>) -> Self {
        StoreError::Unavailable(err.into())
    }

    /// Stable code returned to API clients.
    pub fn code(&self) -> &'static str {
        // ---
        match self {
            StoreError::DuplicateEmail => "DUPLICATE_EMAIL",
            StoreError::FetchSettings(_) => "FETCH_SETTINGS",
            StoreError::SaveSettings(_) => "SAVE_SETTINGS",
            StoreError::NotConfigured => "NOT_CONFIGURED",
            StoreError::Unavailable(_) => "UNKNOWN",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
