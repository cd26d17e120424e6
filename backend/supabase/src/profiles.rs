//! Profiles table over PostgREST, used as the quota ledger.

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, warn};

use gamegate_core::{
    GateError, LedgerRevision, LedgerStore, LedgerUpdate, ProfileRecord, UserIdentity, WriteOutcome,
};

use crate::client::SupabaseClient;
use crate::wire::{revision_filters, LedgerPatch, ProfileRow, PROFILE_COLUMNS};

pub const DEFAULT_PROFILES_TABLE: &str = "profiles";

pub struct ProfileStore {
    client: SupabaseClient,
    table: String,
}

impl ProfileStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            table: DEFAULT_PROFILES_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

fn upstream(e: reqwest::Error) -> GateError {
    GateError::UpstreamUnavailable(format!("profile store request failed: {e}"))
}

#[async_trait]
impl LedgerStore for ProfileStore {
    async fn read(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError> {
        let rows: Vec<ProfileRow> = self
            .client
            .rest_request(Method::GET, &self.table)
            .query(&[("id", format!("eq.{}", user.id)), ("select", PROFILE_COLUMNS.to_string())])
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let row = rows.into_iter().next().ok_or_else(|| {
            debug!(user = %user.id, "No profile row");
            GateError::ProfileNotFound
        })?;
        row.into_record()
    }

    async fn compare_and_set(
        &self,
        user: &UserIdentity,
        expected: &LedgerRevision,
        update: &LedgerUpdate,
    ) -> Result<WriteOutcome, GateError> {
        let mut query = revision_filters(user.id, expected);
        query.push(("select", "id".to_string()));

        let updated: Vec<serde_json::Value> = self
            .client
            .rest_request(Method::PATCH, &self.table)
            .query(&query)
            .header("Prefer", "return=representation")
            .json(&LedgerPatch::from(update))
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        if updated.is_empty() {
            warn!(user = %user.id, "Ledger row changed since read; write rejected");
            Ok(WriteOutcome::Conflict)
        } else {
            Ok(WriteOutcome::Applied)
        }
    }
}
