use axum::{Json, extract::State};
use gamegate_core::QuotaStatus;

use crate::auth::RequireCredential;
use crate::error::ApiError;
use crate::state::AppState;

/// Handler for `GET /api/quota`
pub async fn get_quota(
    State(state): State<AppState>,
    RequireCredential(credential): RequireCredential,
) -> Result<Json<QuotaStatus>, ApiError> {
    Ok(Json(state.access.quota(&credential).await?))
}
