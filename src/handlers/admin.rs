//! Admin gate and dashboard.
//!
//! `login` and `logout` are open. Everything else under `/admin` sits behind
//! [`require_admin`], which only checks for the `admin_auth=true` marker
//! cookie. The password itself is checked by a procedure in the store; the
//! service never sees or stores a hash.

use super::shared_types::{ActionResponse, ApiError};
use crate::app_state::AppState;
use crate::domain::{
    parse_countdown_date, Guess, NewRegistry, Prediction, PredictionStats, Registry,
    RevealState, RevealUpdate,
};
use crate::session;
use axum::{
    extract::{Path, Request, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const INCORRECT_PASSWORD: &str = "Incorrect password. Please try again.";
const VERIFY_FAILED: &str = "Unable to verify password. Please try again.";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    // ---
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RevealUpdateRequest {
    // ---
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub countdown_date: String,
    pub gender: Option<Guess>,
    #[serde(default)]
    pub is_revealed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddRegistryRequest {
    // ---
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    // ---
    pub reveal_state: RevealState,
    pub predictions: Vec<Prediction>,
    pub stats: PredictionStats,
    pub registries: Vec<Registry>,
}

#[derive(Debug, Serialize)]
pub struct RevealUpdateResponse {
    // ---
    #[serde(flatten)]
    pub outcome: ActionResponse,
    pub reveal_state: RevealState,
}

fn with_cookie(cookie: String) -> HeaderMap {
    // ---
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.insert(SET_COOKIE, value);
        }
        Err(err) => tracing::error!("Unencodable admin cookie: {err}"),
    }
    headers
}

// ============================================================================
// Gate
// ============================================================================

/// Rejects requests without the admin marker cookie.
pub async fn require_admin(request: Request, next: Next) -> Response {
    // ---
    if !session::is_admin(request.headers()) {
        tracing::debug!("Admin request without admin cookie: {}", request.uri().path());
        return ApiError::Unauthorized("Admin login required.").into_response();
    }
    next.run(request).await
}

/// POST /admin/login
///
/// # Request Body
/// ```json
/// { "password": "..." }
/// ```
///
/// A missing password and a wrong one get the same answer; a failed
/// verification call gets "try again".
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<ActionResponse>), ApiError> {
    // ---
    if req.password.is_empty() {
        state.metrics().record_admin_login(false);
        return Err(ApiError::Unauthorized(INCORRECT_PASSWORD));
    }

    let verified = state
        .admin_verifier()
        .verify(&req.password)
        .await
        .map_err(ApiError::admin(VERIFY_FAILED))?;

    state.metrics().record_admin_login(verified);
    if !verified {
        tracing::info!("Admin login rejected");
        return Err(ApiError::Unauthorized(INCORRECT_PASSWORD));
    }

    tracing::info!("Admin login accepted");
    Ok((
        with_cookie(state.cookies().admin_login()),
        Json(ActionResponse::ok("Logged in.")),
    ))
}

/// POST /admin/logout
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<ActionResponse>) {
    // ---
    (
        with_cookie(state.cookies().admin_logout()),
        Json(ActionResponse::ok("Logged out.")),
    )
}

/// GET /admin/dashboard
///
/// Full reveal state (including an unrevealed gender), every prediction
/// newest first, live statistics and the registries.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    // ---
    let reveal_state = state.reveal_state_store().read().await?;
    let predictions = state
        .predictions()
        .list()
        .await
        .map_err(ApiError::admin("Failed to load predictions."))?;
    let registries = state
        .registries()
        .list()
        .await
        .map_err(ApiError::admin("Failed to load registries."))?;

    let stats = PredictionStats::compute(predictions.iter().map(|p| p.prediction));

    Ok(Json(DashboardResponse {
        reveal_state,
        predictions,
        stats,
        registries,
    }))
}

/// PUT /admin/reveal
///
/// Saves the countdown date, gender and reveal flag. Guests with an open
/// event stream see the change immediately.
#[tracing::instrument(skip(state, req))]
pub async fn update_reveal(
    State(state): State<AppState>,
    Json(req): Json<RevealUpdateRequest>,
) -> Result<Json<RevealUpdateResponse>, ApiError> {
    // ---
    let countdown_date = parse_countdown_date(&req.countdown_date).map_err(|_| {
        ApiError::invalid(
            "countdown_date",
            "Please enter a valid date (YYYY-MM-DD or RFC 3339)",
        )
    })?;

    let update = RevealUpdate {
        countdown_date,
        gender: req.gender,
        is_revealed: req.is_revealed,
    };
    let reveal_state = state.reveal_state_store().update(&update).await?;

    tracing::info!(
        "Reveal state saved: revealed={} countdown={}",
        reveal_state.is_revealed,
        reveal_state.countdown_date
    );
    // Publish first so concurrent readers see their row is superseded,
    // then write the saved row through to the cache.
    state.hub().publish(reveal_state.clone());
    state.cache().put_reveal_state(&reveal_state).await;

    Ok(Json(RevealUpdateResponse {
        outcome: ActionResponse::ok("Settings saved successfully!"),
        reveal_state,
    }))
}

/// DELETE /admin/predictions/{id}
pub async fn delete_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    // ---
    state
        .predictions()
        .delete_by_id(id)
        .await
        .map_err(ApiError::admin("Failed to delete prediction."))?;

    tracing::info!("Prediction {id} deleted");
    state.cache().invalidate_stats().await;

    Ok(Json(ActionResponse::ok("Prediction deleted.")))
}

/// POST /admin/registries
pub async fn add_registry(
    State(state): State<AppState>,
    Json(req): Json<AddRegistryRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
    // ---
    let registry = NewRegistry::parse(&req.name, &req.url)?;

    state
        .registries()
        .add(&registry)
        .await
        .map_err(ApiError::admin("Failed to add registry."))?;

    tracing::info!("Registry added: {}", registry.name());
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Registry added successfully!")),
    ))
}

/// DELETE /admin/registries/{id}
pub async fn remove_registry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    // ---
    state
        .registries()
        .remove(id)
        .await
        .map_err(ApiError::admin("Failed to delete registry."))?;

    tracing::info!("Registry {id} removed");
    Ok(Json(ActionResponse::ok("Registry deleted.")))
}
