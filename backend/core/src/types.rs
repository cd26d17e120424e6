use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GateError;
use crate::history::SessionHistory;

/// A user resolved from a valid credential by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Bearer token presented by the client, extracted once per request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token. Blank tokens are not credentials.
    pub fn new(token: impl AsRef<str>) -> Option<Self> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Account class. Premium bypasses all quota logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    /// Map the profile `role` column to a tier. Anything but "premium" is free.
    pub fn from_role(role: Option<&str>) -> Self {
        match role {
            Some(r) if r.trim().eq_ignore_ascii_case("premium") => Tier::Premium,
            _ => Tier::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }
}

/// Identifier of a gated game page (its slug).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Parse a slug. Only `[A-Za-z0-9_-]` is accepted, so a valid id is always
    /// safe to use as a file stem.
    pub fn parse(slug: &str) -> Result<Self, GateError> {
        if Self::is_valid_slug(slug) {
            Ok(Self(slug.to_string()))
        } else {
            Err(GateError::ResourceNotFound(slug.to_string()))
        }
    }

    /// Non-empty and `[A-Za-z0-9_-]` only.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of games that may be served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameCatalog {
    games: BTreeSet<ResourceId>,
}

impl GameCatalog {
    pub fn new<I, S>(slugs: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let games = slugs
            .into_iter()
            .map(|s| ResourceId::parse(s.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { games })
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.games.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceId> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// Free-tier quota parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Distinct session starts allowed per UTC calendar day.
    pub max_sessions_per_day: u32,
    /// How long a started session stays open at no extra cost.
    pub session_window: Duration,
}

impl QuotaPolicy {
    pub fn new(max_sessions_per_day: u32, session_window_minutes: u32) -> Self {
        Self {
            max_sessions_per_day,
            session_window: Duration::minutes(i64::from(session_window_minutes)),
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(2, 15)
    }
}

/// Quota state read from a user's profile row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub session_start: Option<DateTime<Utc>>,
    pub session_count: u32,
    pub session_history: SessionHistory,
}

/// New ledger fields proposed by the gate when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerUpdate {
    pub session_start: DateTime<Utc>,
    pub session_count: u32,
    pub session_history: SessionHistory,
}

impl LedgerUpdate {
    pub fn apply_to(&self, ledger: &mut LedgerSnapshot) {
        ledger.session_start = Some(self.session_start);
        ledger.session_count = self.session_count;
        ledger.session_history = self.session_history.clone();
    }
}

/// Raw ledger values exactly as stored when the row was read. A conditional
/// write only applies while the row still carries these values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRevision {
    pub session_start: Option<String>,
    pub session_count: Option<i64>,
}

/// A profile row: tier, ledger, and the revision it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRecord {
    pub tier: Tier,
    pub ledger: LedgerSnapshot,
    pub revision: LedgerRevision,
}

/// Result of a conditional ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// Another writer changed the row after it was read.
    Conflict,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    LimitReached,
    Unauthenticated,
    NotFound,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::LimitReached => "LIMIT_REACHED",
            DenyReason::Unauthenticated => "UNAUTHENTICATED",
            DenyReason::NotFound => "NOT_FOUND",
        }
    }
}

/// Output of the access gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the resource, persisting the update first if one is present.
    Allow(Option<LedgerUpdate>),
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }

    pub fn mutation(&self) -> Option<&LedgerUpdate> {
        match self {
            AccessDecision::Allow(update) => update.as_ref(),
            AccessDecision::Deny(_) => None,
        }
    }
}

/// Tokens issued by the identity backend after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Result of a sign-in or sign-up. Sign-up may yield a user without tokens
/// when the backend requires e-mail confirmation first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: UserIdentity,
    pub tokens: Option<SessionTokens>,
}
