use super::shared_types::{ApiError, ApiResponse};
use crate::app_state::AppState;
use crate::domain::Registry;
use axum::extract::State;

/// GET /api/registries
///
/// Gift registry links, oldest first.
pub async fn list_registries(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Registry>>, ApiError> {
    // ---
    let registries = state.registries().list().await?;
    Ok(ApiResponse { data: registries })
}
