//! In-memory ledger store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::GateError;
use crate::history::SessionHistory;
use crate::traits::LedgerStore;
use crate::types::{
    LedgerRevision, LedgerSnapshot, LedgerUpdate, ProfileRecord, Tier, UserIdentity, WriteOutcome,
};

#[derive(Debug, Clone, Default)]
struct StoredProfile {
    tier: Tier,
    session_start: Option<DateTime<Utc>>,
    session_count: Option<u32>,
    session_history: SessionHistory,
}

impl StoredProfile {
    fn revision(&self) -> LedgerRevision {
        LedgerRevision {
            session_start: self.session_start.map(|start| start.to_rfc3339()),
            session_count: self.session_count.map(i64::from),
        }
    }
}

/// Profile rows held in process memory, keyed by user id.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    rows: Arc<RwLock<HashMap<Uuid, StoredProfile>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty profile row for `id`.
    pub async fn insert_profile(&self, id: Uuid, tier: Tier) {
        self.rows.write().await.insert(
            id,
            StoredProfile {
                tier,
                ..Default::default()
            },
        );
    }

    /// Overwrite the ledger fields of an existing row.
    pub async fn set_ledger(&self, id: Uuid, ledger: LedgerSnapshot) {
        if let Some(row) = self.rows.write().await.get_mut(&id) {
            row.session_start = ledger.session_start;
            row.session_count = Some(ledger.session_count);
            row.session_history = ledger.session_history;
        }
    }

    /// Current ledger of a row, if present.
    pub async fn snapshot(&self, id: Uuid) -> Option<LedgerSnapshot> {
        self.rows.read().await.get(&id).map(|row| LedgerSnapshot {
            session_start: row.session_start,
            session_count: row.session_count.unwrap_or(0),
            session_history: row.session_history.clone(),
        })
    }

    /// Make every subsequent write fail as if the store were unreachable.
    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn read(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError> {
        let rows = self.rows.read().await;
        let row = rows.get(&user.id).ok_or(GateError::ProfileNotFound)?;
        Ok(ProfileRecord {
            tier: row.tier,
            ledger: LedgerSnapshot {
                session_start: row.session_start,
                session_count: row.session_count.unwrap_or(0),
                session_history: row.session_history.clone(),
            },
            revision: row.revision(),
        })
    }

    async fn compare_and_set(
        &self,
        user: &UserIdentity,
        expected: &LedgerRevision,
        update: &LedgerUpdate,
    ) -> Result<WriteOutcome, GateError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GateError::UpstreamUnavailable("ledger writes disabled".into()));
        }

        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&user.id).ok_or(GateError::ProfileNotFound)?;

        if row.revision() != *expected {
            debug!(user = %user.id, "Ledger revision moved; rejecting write");
            return Ok(WriteOutcome::Conflict);
        }

        row.session_start = Some(update.session_start);
        row.session_count = Some(update.session_count);
        row.session_history = update.session_history.clone();
        Ok(WriteOutcome::Applied)
    }
}
