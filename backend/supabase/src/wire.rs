//! JSON shapes exchanged with GoTrue and PostgREST, and their lenient
//! conversion into core types.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use gamegate_core::{
    AuthSession, GateError, HistoryEntry, LedgerRevision, LedgerSnapshot, LedgerUpdate,
    ProfileRecord, SessionHistory, SessionTokens, Tier, UserIdentity,
};

/// Columns selected from the profiles table.
pub const PROFILE_COLUMNS: &str = "role,session_start,session_count,session_history";

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UserPayload> for UserIdentity {
    fn from(user: UserPayload) -> Self {
        UserIdentity {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `/token?grant_type=password` and of `/signup` when a session is
/// issued immediately.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<UserPayload>,
}

/// Turn a sign-in or sign-up body into a session. Sign-up answers with the
/// bare user object when confirmation is pending.
pub fn parse_auth_session(body: Value) -> Option<AuthSession> {
    let token: TokenResponse = serde_json::from_value(body.clone()).ok()?;
    let user = match token.user {
        Some(user) => user,
        None => serde_json::from_value::<UserPayload>(body).ok()?,
    };
    let tokens = token.access_token.map(|access_token| SessionTokens {
        access_token,
        refresh_token: token.refresh_token,
        expires_in: token.expires_in,
    });
    Some(AuthSession {
        user: user.into(),
        tokens,
    })
}

/// Human-readable message from a GoTrue error body.
pub fn error_message(body: &Value) -> Option<String> {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// One row of the profiles table, as returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub session_start: Option<String>,
    #[serde(default)]
    pub session_count: Option<i64>,
    #[serde(default)]
    pub session_history: Option<Value>,
}

impl ProfileRow {
    /// Decode leniently: null count is 0, non-array history is empty and
    /// malformed entries are skipped. A `session_start` that is present but
    /// unreadable is an error, never "no prior session".
    pub fn into_record(self) -> Result<ProfileRecord, GateError> {
        let session_start = self
            .session_start
            .as_deref()
            .map(|raw| {
                parse_timestamp(raw).ok_or_else(|| {
                    GateError::UpstreamUnavailable(format!("unreadable session_start {raw:?}"))
                })
            })
            .transpose()?;
        let session_count = self
            .session_count
            .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0);
        let session_history = match &self.session_history {
            Some(Value::Array(items)) => SessionHistory::from_entries(
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<HistoryEntry>(item.clone()).ok()),
            ),
            _ => SessionHistory::new(),
        };

        Ok(ProfileRecord {
            tier: Tier::from_role(self.role.as_deref()),
            ledger: LedgerSnapshot {
                session_start,
                session_count,
                session_history,
            },
            revision: LedgerRevision {
                session_start: self.session_start,
                session_count: self.session_count,
            },
        })
    }
}

/// RFC 3339, or an offset-less `timestamp` column value read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// PATCH body for a session start.
#[derive(Debug, Serialize)]
pub struct LedgerPatch<'a> {
    pub session_start: String,
    pub session_count: u32,
    pub session_history: &'a SessionHistory,
}

impl<'a> From<&'a LedgerUpdate> for LedgerPatch<'a> {
    fn from(update: &'a LedgerUpdate) -> Self {
        LedgerPatch {
            session_start: format_timestamp(update.session_start),
            session_count: update.session_count,
            session_history: &update.session_history,
        }
    }
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// PostgREST filters selecting `id` at exactly `revision`.
pub fn revision_filters(id: Uuid, revision: &LedgerRevision) -> Vec<(&'static str, String)> {
    let session_start = match &revision.session_start {
        Some(raw) => format!("eq.{raw}"),
        None => "is.null".to_string(),
    };
    let session_count = match revision.session_count {
        Some(n) => format!("eq.{n}"),
        None => "is.null".to_string(),
    };
    vec![
        ("id", format!("eq.{id}")),
        ("session_start", session_start),
        ("session_count", session_count),
    ]
}
