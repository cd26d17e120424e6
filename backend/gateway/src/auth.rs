//! Request credential extraction.
//!
//! The access-token cookie is read first, then `Authorization: Bearer`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use gamegate_core::Credential;
use tracing::debug;

use crate::cookies::read_cookie;
use crate::error::ApiError;
use crate::state::AppState;

/// The caller's credential. Rejects with 401 when none is present.
pub struct RequireCredential(pub Credential);

#[async_trait]
impl FromRequestParts<AppState> for RequireCredential {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_credential(&parts.headers, &state.cookies.access_name)
            .map(RequireCredential)
            .ok_or_else(|| {
                debug!("Missing credentials");
                ApiError::MissingCredential
            })
    }
}

pub fn extract_credential(headers: &HeaderMap, cookie_name: &str) -> Option<Credential> {
    read_cookie(headers, cookie_name)
        .and_then(Credential::new)
        .or_else(|| bearer_token(headers).and_then(Credential::new))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};

    #[test]
    fn prefers_cookie_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sb-access-token=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let credential = extract_credential(&headers, "sb-access-token").unwrap();
        assert_eq!(credential.token(), "from-cookie");
    }

    #[test]
    fn falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let credential = extract_credential(&headers, "sb-access-token").unwrap();
        assert_eq!(credential.token(), "from-header");
    }

    #[test]
    fn blank_or_missing_is_none() {
        let mut headers = HeaderMap::new();
        assert!(extract_credential(&headers, "sb-access-token").is_none());
        headers.insert(COOKIE, HeaderValue::from_static("sb-access-token="));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_credential(&headers, "sb-access-token").is_none());
    }
}
