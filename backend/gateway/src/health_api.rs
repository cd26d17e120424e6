use axum::Json;
use serde_json::{Value, json};

/// Handler for `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gamegate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
