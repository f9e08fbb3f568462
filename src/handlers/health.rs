use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct HealthQuery {
    mode: Option<String>,
}

/// Responds with the health status of the server.
///
/// - By default (no query parameters), performs a light check to confirm the web server
///   is running.
///
/// - If `mode=full` is passed as a query parameter, also pings the view cache and reads
///   the reveal state from Postgres, which fails if the singleton was never seeded.
///
/// # Query Parameters
/// - `mode`: Optional. Accepts `"light"` (default) or `"full"`.
///
/// # Responses
/// - `200 OK` with `{ "status": "ok" }` if server (and backends, in full mode) are healthy.
/// - `503 SERVICE UNAVAILABLE` with `{ "status": "error" }` if a backend check fails in full mode.
///
/// # Examples
/// - `GET /health` → 200 OK
/// - `GET /health?mode=full` → 200 OK or 503 SERVICE UNAVAILABLE
pub async fn health_check(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> (StatusCode, Json<HealthResponse>) {
    // ---
    if params.mode.as_deref() != Some("full") {
        return (StatusCode::OK, Json(HealthResponse { status: "ok" }));
    }

    if let Err(err) = state.cache().ping().await {
        tracing::warn!("Health check: cache ping failed: {err}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "error" }),
        );
    }

    if let Err(err) = state.reveal_state_store().read().await {
        tracing::warn!("Health check: reveal state read failed: {err}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "error" }),
        );
    }

    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}
