//! In-memory identity backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::GateError;
use crate::traits::{AccountService, IdentityVerifier};
use crate::types::{AuthSession, Credential, SessionTokens, UserIdentity};

#[derive(Default)]
struct Accounts {
    // email -> (password, user)
    passwords: HashMap<String, (String, UserIdentity)>,
    // access token -> user
    tokens: HashMap<String, UserIdentity>,
}

/// Identity backend holding accounts and issued tokens in memory.
#[derive(Clone, Default)]
pub struct StaticIdentityVerifier {
    accounts: Arc<RwLock<Accounts>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a credential for `user`.
    pub async fn insert_token(&self, token: impl Into<String>, user: UserIdentity) {
        self.accounts.write().await.tokens.insert(token.into(), user);
    }

    /// Register an account that can sign in with `email` / `password`.
    pub async fn insert_account(&self, email: &str, password: &str) -> UserIdentity {
        let user = UserIdentity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.accounts
            .write()
            .await
            .passwords
            .insert(email.to_lowercase(), (password.to_string(), user.clone()));
        user
    }

    async fn issue(&self, user: UserIdentity) -> AuthSession {
        let access_token = format!("access-{}", Uuid::new_v4());
        let refresh_token = format!("refresh-{}", Uuid::new_v4());
        self.accounts
            .write()
            .await
            .tokens
            .insert(access_token.clone(), user.clone());
        AuthSession {
            user,
            tokens: Some(SessionTokens {
                access_token,
                refresh_token: Some(refresh_token),
                expires_in: Some(3600),
            }),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, credential: &Credential) -> Result<UserIdentity, GateError> {
        self.accounts
            .read()
            .await
            .tokens
            .get(credential.token())
            .cloned()
            .ok_or(GateError::Unauthorized)
    }
}

#[async_trait]
impl AccountService for StaticIdentityVerifier {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GateError> {
        let user = {
            let accounts = self.accounts.read().await;
            match accounts.passwords.get(&email.to_lowercase()) {
                Some((stored, user)) if stored == password => user.clone(),
                _ => {
                    debug!("Rejected sign-in with bad credentials");
                    return Err(GateError::InvalidRequest("Invalid login credentials".into()));
                }
            }
        };
        Ok(self.issue(user).await)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, GateError> {
        if self
            .accounts
            .read()
            .await
            .passwords
            .contains_key(&email.to_lowercase())
        {
            return Err(GateError::InvalidRequest("User already registered".into()));
        }
        let user = self.insert_account(email, password).await;
        Ok(self.issue(user).await)
    }

    async fn sign_out(&self, credential: &Credential) -> Result<(), GateError> {
        self.accounts
            .write()
            .await
            .tokens
            .remove(credential.token())
            .map(|_| ())
            .ok_or(GateError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let verifier = StaticIdentityVerifier::new();
        let cred = Credential::new("nope").unwrap();
        assert!(matches!(verifier.verify(&cred).await, Err(GateError::Unauthorized)));
    }

    #[tokio::test]
    async fn sign_in_issues_verifiable_token() {
        let backend = StaticIdentityVerifier::new();
        let user = backend.insert_account("a@example.com", "hunter22").await;

        let session = backend.sign_in("A@example.com", "hunter22").await.unwrap();
        let tokens = session.tokens.unwrap();
        let cred = Credential::new(&tokens.access_token).unwrap();
        assert_eq!(backend.verify(&cred).await.unwrap(), user);

        backend.sign_out(&cred).await.unwrap();
        assert!(backend.verify(&cred).await.is_err());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let backend = StaticIdentityVerifier::new();
        backend.insert_account("a@example.com", "hunter22").await;
        assert!(backend.sign_in("a@example.com", "wrong").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let backend = StaticIdentityVerifier::new();
        backend.sign_up("b@example.com", "pw123456").await.unwrap();
        assert!(backend.sign_up("b@example.com", "pw123456").await.is_err());
    }
}
