//! Decides what a visitor sees: the prediction form, their recorded guess,
//! or the reveal.
//!
//! The view is always recomputed from two inputs, the latest reveal state and
//! the visitor's resolved prediction. Nothing is patched incrementally, so a
//! late push event or a fresh submission can never leave the view stale.

use super::errors::StoreResult;
use super::identity::IdentityStore;
use super::models::{NewPrediction, Prediction, RevealState};
use super::repository::PredictionStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// No resolved prediction yet: show the form.
    Predicting,
    /// Prediction on file, reveal not live.
    Recorded,
    /// Prediction on file and the reveal is live.
    Revealed,
}

/// A visitor without a resolved prediction never gets `Revealed`.
pub fn decide_view(reveal: &RevealState, prediction: Option<&Prediction>) -> View {
    // ---
    match (prediction, reveal.is_revealed) {
        (None, _) => View::Predicting,
        (Some(_), false) => View::Recorded,
        (Some(_), true) => View::Revealed,
    }
}

/// Per-page-view state machine over `(reveal state, resolved prediction)`.
#[derive(Debug, Clone)]
pub struct RevealOrchestrator {
    reveal: RevealState,
    resolved: Option<Prediction>,
}

impl RevealOrchestrator {
    // ---

    /// A visitor with no resolved prediction yet.
    pub fn new(reveal: RevealState) -> Self {
        Self {
            reveal,
            resolved: None,
        }
    }

    /// Page load: confirm the stored identity against the store.
    ///
    /// A stale identity (no matching row) is cleared. A store failure degrades
    /// to `Predicting` without touching the identity.
    pub async fn resolve<I>(
        reveal: RevealState,
        identity: &mut I,
        predictions: &dyn PredictionStore,
    ) -> Self
    where
        I: IdentityStore + ?Sized,
    {
        // ---
        let resolved = match identity.load() {
            None => None,
            Some(email) => match predictions.find_by_email(&email).await {
                Ok(Some(prediction)) => {
                    identity.save(&prediction.email);
                    Some(prediction)
                }
                Ok(None) => {
                    tracing::debug!("Stored guest identity has no prediction, clearing it");
                    identity.clear();
                    None
                }
                Err(err) => {
                    tracing::warn!("Prediction lookup failed during page load: {err}");
                    None
                }
            },
        };

        Self { reveal, resolved }
    }

    /// Submit a new prediction and adopt it on success.
    pub async fn submit<I>(
        &mut self,
        identity: &mut I,
        predictions: &dyn PredictionStore,
        submission: &NewPrediction,
    ) -> StoreResult<&Prediction>
    where
        I: IdentityStore + ?Sized,
    {
        // ---
        let created = predictions.create(submission).await?;
        identity.save(&created.email);

        let adopted = self.resolved.insert(created);
        Ok(&*adopted)
    }

    /// "Find my prediction": adopt an existing prediction by email.
    ///
    /// A miss leaves the current state alone and returns `Ok(None)`.
    pub async fn find<I>(
        &mut self,
        identity: &mut I,
        predictions: &dyn PredictionStore,
        email: &str,
    ) -> StoreResult<Option<&Prediction>>
    where
        I: IdentityStore + ?Sized,
    {
        // ---
        match predictions.find_by_email(email).await? {
            Some(found) => {
                identity.save(&found.email);
                let adopted = self.resolved.insert(found);
                Ok(Some(&*adopted))
            }
            None => Ok(None),
        }
    }

    /// Take the newest reveal state (last write wins) and return the new view.
    pub fn apply(&mut self, reveal: RevealState) -> View {
        // ---
        self.reveal = reveal;
        self.view()
    }

    pub fn view(&self) -> View {
        decide_view(&self.reveal, self.resolved.as_ref())
    }

    pub fn reveal(&self) -> &RevealState {
        &self.reveal
    }

    pub fn resolved(&self) -> Option<&Prediction> {
        self.resolved.as_ref()
    }
}
