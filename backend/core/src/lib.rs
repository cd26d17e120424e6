//! `gamegate-core`: domain model and quota gating for gamegate.
//!
//! Provides:
//! - Identity, credential, tier, and ledger types
//! - The pure access gate (`gate::decide`) and quota status view
//! - Collaborator traits for identity verification, accounts, and ledger storage
//! - In-memory collaborators for tests and local development

pub mod error;
pub mod gate;
pub mod history;
pub mod identity;
pub mod ledger;
pub mod traits;
pub mod types;

pub use error::GateError;
pub use gate::{decide, quota_status, QuotaStatus};
pub use history::{HistoryEntry, SessionHistory, HISTORY_LIMIT};
pub use identity::StaticIdentityVerifier;
pub use ledger::InMemoryLedger;
pub use traits::{AccountService, IdentityVerifier, LedgerStore};
pub use types::{
    AccessDecision, AuthSession, Credential, DenyReason, GameCatalog, LedgerRevision,
    LedgerSnapshot, LedgerUpdate, ProfileRecord, QuotaPolicy, ResourceId, SessionTokens, Tier,
    UserIdentity, WriteOutcome,
};
