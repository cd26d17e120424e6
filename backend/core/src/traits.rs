use async_trait::async_trait;

use crate::error::GateError;
use crate::types::{
    AuthSession, Credential, LedgerRevision, LedgerUpdate, ProfileRecord, UserIdentity,
    WriteOutcome,
};

/// Resolves a bearer credential to a user.
///
/// Implementations must report every failure (missing, expired, malformed,
/// backend down) as [`GateError::Unauthorized`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &Credential) -> Result<UserIdentity, GateError>;
}

/// Password sign-in, sign-up, and sign-out against the identity backend.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GateError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, GateError>;

    async fn sign_out(&self, credential: &Credential) -> Result<(), GateError>;
}

/// Durable per-user profile and quota ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read the user's profile row. A missing row is [`GateError::ProfileNotFound`].
    async fn read(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError>;

    /// Write `update` only if the row still matches `expected`.
    async fn compare_and_set(
        &self,
        user: &UserIdentity,
        expected: &LedgerRevision,
        update: &LedgerUpdate,
    ) -> Result<WriteOutcome, GateError>;
}
