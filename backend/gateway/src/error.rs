//! Mapping of gate errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gamegate_core::GateError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    MissingCredential,

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let gate = match self {
            ApiError::MissingCredential => {
                return (StatusCode::UNAUTHORIZED, "Not authenticated").into_response();
            }
            ApiError::Gate(gate) => gate,
        };

        match gate {
            GateError::Unauthorized | GateError::ProfileNotFound => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
            }
            GateError::LimitReached => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "LIMIT_REACHED",
                    "message": "Free session limit reached. Please upgrade.",
                })),
            )
                .into_response(),
            GateError::ResourceNotFound(_) => {
                (StatusCode::NOT_FOUND, "Game not found").into_response()
            }
            GateError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            GateError::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
            }
            GateError::Content(_) | GateError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn maps_statuses() {
        assert_eq!(status(ApiError::MissingCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GateError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GateError::ProfileNotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GateError::LimitReached), StatusCode::FORBIDDEN);
        assert_eq!(status(GateError::ResourceNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status(GateError::UpstreamUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status(GateError::Content("io".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(GateError::InvalidRequest("bad".into())), StatusCode::BAD_REQUEST);
    }
}
