//! Gated game pages.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use gamegate_core::ResourceId;
use serde_json::{Value, json};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::auth::RequireCredential;
use crate::content::html_response;
use crate::error::ApiError;
use crate::state::AppState;

/// Handler for `GET /api/games/:slug`
pub async fn get_game(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RequireCredential(credential): RequireCredential,
) -> Result<Response, ApiError> {
    let span = info_span!("game_request", request_id = %Uuid::new_v4(), slug = %slug);

    async move {
        let grant = state.access.request_access(&credential, &slug).await?;
        let html = state.content.load(&grant.resource).await?;
        info!(user = %grant.user.id, new_session = grant.new_session, "Serving game");
        Ok(html_response(html))
    }
    .instrument(span)
    .await
}

/// Handler for `GET /api/games`
pub async fn list_games(State(state): State<AppState>) -> Json<Value> {
    let games: Vec<&str> = state.access.catalog().iter().map(ResourceId::as_str).collect();
    Json(json!({ "games": games }))
}
