//! The access gate: a pure decision over (time, tier, ledger, policy).
//!
//! A "session" is a time-boxed grant. Requests inside an open window are free;
//! only opening a new window consumes one of the day's slots. Days are UTC
//! calendar days, so a new day always resets the counter to 1 even if the
//! previous window has not elapsed yet.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::history::SessionHistory;
use crate::types::{
    AccessDecision, DenyReason, GameCatalog, LedgerSnapshot, LedgerUpdate, QuotaPolicy,
    ResourceId, Tier,
};

/// Decide whether a request for `resource` may be served.
pub fn decide(
    now: DateTime<Utc>,
    tier: Tier,
    ledger: &LedgerSnapshot,
    policy: &QuotaPolicy,
    resource: &ResourceId,
    catalog: &GameCatalog,
) -> AccessDecision {
    // Unknown resources never consume quota.
    if !catalog.contains(resource) {
        return AccessDecision::Deny(DenyReason::NotFound);
    }

    if tier == Tier::Premium {
        return AccessDecision::Allow(None);
    }

    let today = now.date_naive();
    let started_today = started_on(ledger, today);

    if !session_expired(now, ledger, policy) {
        return AccessDecision::Allow(None);
    }

    if started_today && ledger.session_count >= policy.max_sessions_per_day {
        return AccessDecision::Deny(DenyReason::LimitReached);
    }

    let session_count = if started_today {
        ledger.session_count.saturating_add(1)
    } else {
        1
    };

    let mut session_history = ledger.session_history.clone();
    session_history.record(today, session_count);

    AccessDecision::Allow(Some(LedgerUpdate {
        session_start: now,
        session_count,
        session_history,
    }))
}

/// True when no session window is currently open: no prior session, the
/// session began on another day, or the window has elapsed.
fn session_expired(now: DateTime<Utc>, ledger: &LedgerSnapshot, policy: &QuotaPolicy) -> bool {
    match ledger.session_start {
        None => true,
        Some(start) => {
            start.date_naive() != now.date_naive() || now - start > policy.session_window
        }
    }
}

fn started_on(ledger: &LedgerSnapshot, day: NaiveDate) -> bool {
    ledger
        .session_start
        .map(|start| start.date_naive() == day)
        .unwrap_or(false)
}

/// Read-only view of a user's quota, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub tier: Tier,
    pub unlimited: bool,
    pub sessions_today: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sessions_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_sessions: Option<u32>,
    pub session_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ends_at: Option<DateTime<Utc>>,
    pub history: SessionHistory,
}

pub fn quota_status(
    now: DateTime<Utc>,
    tier: Tier,
    ledger: &LedgerSnapshot,
    policy: &QuotaPolicy,
) -> QuotaStatus {
    let sessions_today = if started_on(ledger, now.date_naive()) {
        ledger.session_count
    } else {
        0
    };
    let session_active = !session_expired(now, ledger, policy);
    let session_ends_at = if session_active {
        ledger.session_start.map(|start| start + policy.session_window)
    } else {
        None
    };

    match tier {
        Tier::Premium => QuotaStatus {
            tier,
            unlimited: true,
            sessions_today,
            max_sessions_per_day: None,
            remaining_sessions: None,
            session_active,
            session_ends_at,
            history: ledger.session_history.clone(),
        },
        Tier::Free => QuotaStatus {
            tier,
            unlimited: false,
            sessions_today,
            max_sessions_per_day: Some(policy.max_sessions_per_day),
            remaining_sessions: Some(policy.max_sessions_per_day.saturating_sub(sessions_today)),
            session_active,
            session_ends_at,
            history: ledger.session_history.clone(),
        },
    }
}
