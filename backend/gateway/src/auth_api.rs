//! Sign-in, sign-up and cookie endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use gamegate_core::{AuthSession, GateError};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::RequireCredential;
use crate::cookies::{CookieSettings, is_cookie_safe};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl PasswordForm {
    fn validated(&self) -> Result<(&str, &str), GateError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(GateError::InvalidRequest(
                "Email and password are required".into(),
            ));
        }
        Ok((email, &self.password))
    }
}

#[derive(Debug, Deserialize)]
pub struct SetCookieForm {
    #[serde(default)]
    pub token: Option<String>,
}

/// Handler for `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<PasswordForm>,
) -> Result<Response, ApiError> {
    let (email, password) = form.validated()?;
    let session = state.accounts.sign_in(email, password).await?;
    if session.tokens.is_none() {
        return Err(GateError::UpstreamUnavailable("sign-in returned no session".into()).into());
    }
    info!(user = %session.user.id, "Signed in");
    Ok(session_response(&state.cookies, &session))
}

/// Handler for `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<PasswordForm>,
) -> Result<Response, ApiError> {
    let (email, password) = form.validated()?;
    let session = state.accounts.sign_up(email, password).await?;
    info!(user = %session.user.id, confirmed = session.tokens.is_some(), "Signed up");
    Ok(session_response(&state.cookies, &session))
}

/// Handler for `POST /api/auth/set-cookie`
pub async fn set_cookie(
    State(state): State<AppState>,
    Json(form): Json<SetCookieForm>,
) -> Response {
    let token = form.token.as_deref().map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing token" }))).into_response();
    }
    if !is_cookie_safe(token) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid token" }))).into_response();
    }

    let cookie = state.cookies.session_cookie(&state.cookies.access_name, token);
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "message": "Cookie set" })),
    )
        .into_response()
}

/// Handler for `GET|POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    credential: Option<RequireCredential>,
) -> Response {
    if let Some(RequireCredential(credential)) = credential {
        let accounts = Arc::clone(&state.accounts);
        tokio::spawn(async move {
            if let Err(e) = accounts.sign_out(&credential).await {
                warn!(error = %e, "Backend sign-out failed");
            }
        });
    }

    let cleared = state.cookies.cleared().into_iter().map(|c| (SET_COOKIE, c));
    (
        AppendHeaders(cleared),
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    )
        .into_response()
}

fn session_response(cookies: &CookieSettings, session: &AuthSession) -> Response {
    match &session.tokens {
        Some(tokens) => {
            let set = cookies.for_session(tokens).into_iter().map(|c| (SET_COOKIE, c));
            (AppendHeaders(set), Json(json!({ "user": session.user }))).into_response()
        }
        None => Json(json!({ "user": session.user, "confirmationRequired": true })).into_response(),
    }
}
