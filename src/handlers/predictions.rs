//! Guest-facing prediction endpoints.
//!
//! Every response that can change which prediction this browser owns also
//! carries the guest identity cookie.

use super::shared_types::ApiError;
use super::view::{snapshot, StatsView, ViewSnapshot};
use crate::app_state::AppState;
use crate::domain::{
    is_valid_email, normalize_email, Guess, NewPrediction, RevealOrchestrator, StoreError,
};
use crate::session::CookieIdentity;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitPredictionRequest {
    // ---
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// `"boy"` or `"girl"`; anything else is a validation error.
    pub prediction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FindPredictionRequest {
    // ---
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    guess: Option<Guess>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/view
///
/// Page load. Resolves the guest cookie against the store and returns the
/// full page payload. A cookie with no matching prediction is cleared.
#[tracing::instrument(skip(state, headers))]
pub async fn get_view(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<ViewSnapshot>), ApiError> {
    // ---
    let reveal = state.current_reveal_state().await?;

    let mut identity = CookieIdentity::from_headers(&headers, state.cookies());
    let orchestrator =
        RevealOrchestrator::resolve(reveal, &mut identity, state.predictions().as_ref()).await;

    let body = snapshot(&state, &orchestrator).await;

    let mut response_headers = HeaderMap::new();
    identity.apply(&mut response_headers);
    Ok((response_headers, Json(body)))
}

/// POST /api/predictions
///
/// # Request Body
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "prediction": "girl" }
/// ```
///
/// - `201 Created` with the page payload and the identity cookie.
/// - `409 Conflict` when the email already has a prediction.
/// - `422 Unprocessable Entity` with per-field messages on bad input.
#[tracing::instrument(skip(state, headers, req))]
pub async fn submit_prediction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitPredictionRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ViewSnapshot>), ApiError> {
    // ---
    let submission = NewPrediction::parse(&req.name, &req.email, req.prediction.as_deref())?;

    // The reveal may have gone live while the form was open. Read the flag
    // from the store, not the view cache.
    let reveal = state.reveal_state_store().read().await?;

    let mut identity = CookieIdentity::from_headers(&headers, state.cookies());
    let mut orchestrator = RevealOrchestrator::new(reveal);

    match orchestrator
        .submit(&mut identity, state.predictions().as_ref(), &submission)
        .await
    {
        Ok(created) => {
            tracing::info!("Prediction recorded: {} -> {}", created.id, created.prediction);
            state.metrics().record_prediction_created();
        }
        Err(StoreError::DuplicateEmail) => {
            tracing::info!("Duplicate prediction rejected");
            state.metrics().record_duplicate_prediction();
            return Err(StoreError::DuplicateEmail.into());
        }
        Err(err) => return Err(err.into()),
    }

    state.cache().invalidate_stats().await;
    let body = snapshot(&state, &orchestrator).await;

    let mut response_headers = HeaderMap::new();
    identity.apply(&mut response_headers);
    Ok((StatusCode::CREATED, response_headers, Json(body)))
}

/// POST /api/predictions/find
///
/// "Find my prediction". Adopts the prediction filed under `email`.
///
/// - `200 OK` with the page payload and the identity cookie.
/// - `404 Not Found` when nothing is filed under that email.
#[tracing::instrument(skip(state, headers, req))]
pub async fn find_prediction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FindPredictionRequest>,
) -> Result<(HeaderMap, Json<ViewSnapshot>), ApiError> {
    // ---
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(ApiError::invalid("email", "Email is required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::invalid("email", "Please enter a valid email address"));
    }

    let reveal = state.reveal_state_store().read().await?;

    let mut identity = CookieIdentity::from_headers(&headers, state.cookies());
    let mut orchestrator = RevealOrchestrator::new(reveal);

    let found = orchestrator
        .find(&mut identity, state.predictions().as_ref(), &email)
        .await?;
    if found.is_none() {
        return Err(ApiError::NotFound(
            "We couldn't find a prediction for that email.",
        ));
    }

    let body = snapshot(&state, &orchestrator).await;

    let mut response_headers = HeaderMap::new();
    identity.apply(&mut response_headers);
    Ok((response_headers, Json(body)))
}

/// GET /api/stats?guess=boy
///
/// Aggregate tallies. With `guess`, also reports where that guess stands.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsView>, ApiError> {
    // ---
    let stats = state.current_stats().await?;
    let reveal = state.current_reveal_state().await.ok();

    Ok(Json(StatsView::new(stats, query.guess, reveal.as_ref())))
}
