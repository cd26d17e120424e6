//! GoTrue (Supabase Auth) as identity verifier and account service.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use gamegate_core::{
    AccountService, AuthSession, Credential, GateError, IdentityVerifier, UserIdentity,
};

use crate::client::SupabaseClient;
use crate::wire::{error_message, parse_auth_session, PasswordCredentials, UserPayload};

pub struct SupabaseAuth {
    client: SupabaseClient,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn password_call(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, GateError> {
        let response = self
            .client
            .auth_request(Method::POST, path, None)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| GateError::UpstreamUnavailable(format!("auth request failed: {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_server_error() {
            warn!(%status, path, "Auth backend error");
            return Err(GateError::UpstreamUnavailable(format!("auth backend returned {status}")));
        }
        if !status.is_success() {
            let message =
                error_message(&body).unwrap_or_else(|| "Authentication failed".to_string());
            debug!(%status, path, "Auth backend rejected credentials");
            return Err(GateError::InvalidRequest(message));
        }

        parse_auth_session(body)
            .ok_or_else(|| GateError::UpstreamUnavailable("unexpected auth response".into()))
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseAuth {
    async fn verify(&self, credential: &Credential) -> Result<UserIdentity, GateError> {
        let response = self
            .client
            .auth_request(Method::GET, "user", Some(credential.token()))
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "Token verification request failed");
                GateError::Unauthorized
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Token rejected by auth backend");
            return Err(GateError::Unauthorized);
        }

        let user: UserPayload = response.json().await.map_err(|e| {
            debug!(error = %e, "Unreadable user payload");
            GateError::Unauthorized
        })?;
        Ok(user.into())
    }
}

#[async_trait]
impl AccountService for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GateError> {
        self.password_call("token?grant_type=password", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, GateError> {
        self.password_call("signup", email, password).await
    }

    async fn sign_out(&self, credential: &Credential) -> Result<(), GateError> {
        let response = self
            .client
            .auth_request(Method::POST, "logout", Some(credential.token()))
            .send()
            .await
            .map_err(|e| GateError::UpstreamUnavailable(format!("logout request failed: {e}")))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GateError::Unauthorized),
            s => Err(GateError::UpstreamUnavailable(format!("logout returned {s}"))),
        }
    }
}
