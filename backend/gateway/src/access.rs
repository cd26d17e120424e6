//! Access orchestration: verify, read, decide, persist.
//!
//! The ledger write runs as its own task. A request waits for it at most
//! `write_timeout`; a late or failed write never turns an allow into a deny.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gamegate_core::{
    AccessDecision, Credential, DenyReason, GameCatalog, GateError, IdentityVerifier,
    LedgerRevision, LedgerStore, LedgerUpdate, ProfileRecord, QuotaPolicy, QuotaStatus,
    ResourceId, Tier, UserIdentity, WriteOutcome, decide, quota_status,
};
use gamegate_logging::{AccessEvent, EventLogger};
use tracing::{debug, error, instrument, warn};

/// Reads and re-decisions after a conditional write loses a race.
pub const MAX_CLAIM_ATTEMPTS: u32 = 3;

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(2_000);

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A granted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub user: UserIdentity,
    pub resource: ResourceId,
    pub tier: Tier,
    /// Whether this request opened a new session window.
    pub new_session: bool,
}

enum WriteStatus {
    Applied,
    Conflict,
    /// Failed or still running; the task reports its own outcome.
    Unconfirmed,
}

#[derive(Clone)]
pub struct AccessService {
    identity: Arc<dyn IdentityVerifier>,
    ledger: Arc<dyn LedgerStore>,
    catalog: Arc<GameCatalog>,
    policy: QuotaPolicy,
    write_timeout: Duration,
    clock: Clock,
}

impl AccessService {
    pub fn new(
        identity: Arc<dyn IdentityVerifier>,
        ledger: Arc<dyn LedgerStore>,
        catalog: GameCatalog,
        policy: QuotaPolicy,
    ) -> Self {
        Self {
            identity,
            ledger,
            catalog: Arc::new(catalog),
            policy,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Resolve a credential. Every verifier failure is `Unauthorized`.
    pub async fn authenticate(&self, credential: &Credential) -> Result<UserIdentity, GateError> {
        self.identity.verify(credential).await.map_err(|e| {
            debug!(error = %e, "Credential rejected");
            GateError::Unauthorized
        })
    }

    async fn read_profile(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError> {
        match self.ledger.read(user).await {
            Ok(record) => Ok(record),
            Err(GateError::ProfileNotFound) => {
                warn!(user = %user.id, "No profile row for authenticated user");
                Err(GateError::ProfileNotFound)
            }
            Err(e) => {
                error!(user = %user.id, error = %e, "Ledger read failed");
                Err(GateError::UpstreamUnavailable(e.to_string()))
            }
        }
    }

    /// Gate one request for `slug`.
    #[instrument(skip(self, credential))]
    pub async fn request_access(
        &self,
        credential: &Credential,
        slug: &str,
    ) -> Result<Grant, GateError> {
        let user = self.authenticate(credential).await?;

        // Unknown slugs are refused before the ledger is touched.
        let resource = ResourceId::parse(slug)?;
        if !self.catalog.contains(&resource) {
            return Err(GateError::ResourceNotFound(slug.to_string()));
        }

        let user_id = user.id.to_string();
        let mut attempt = 1;
        loop {
            let profile = self.read_profile(&user).await?;
            let now = (self.clock)();

            let decision = decide(
                now,
                profile.tier,
                &profile.ledger,
                &self.policy,
                &resource,
                &self.catalog,
            );

            let update = match decision {
                AccessDecision::Deny(reason) => {
                    EventLogger::log_event(
                        &user_id,
                        AccessEvent::Denied {
                            resource: resource.to_string(),
                            reason: reason.code().to_string(),
                        },
                    );
                    return Err(match reason {
                        DenyReason::LimitReached => GateError::LimitReached,
                        DenyReason::NotFound => GateError::ResourceNotFound(slug.to_string()),
                        DenyReason::Unauthenticated => GateError::Unauthorized,
                    });
                }
                AccessDecision::Allow(None) => {
                    return Ok(self.grant(user, resource, profile.tier, false));
                }
                AccessDecision::Allow(Some(update)) => update,
            };

            match self.persist(&user, profile.revision, update, &resource).await {
                WriteStatus::Applied | WriteStatus::Unconfirmed => {
                    return Ok(self.grant(user, resource, profile.tier, true));
                }
                WriteStatus::Conflict => {
                    EventLogger::log_event(
                        &user_id,
                        AccessEvent::LedgerConflict {
                            resource: resource.to_string(),
                            attempt,
                        },
                    );
                    if attempt >= MAX_CLAIM_ATTEMPTS {
                        warn!(
                            user = %user.id,
                            attempt,
                            "Ledger kept moving; serving on last decision"
                        );
                        return Ok(self.grant(user, resource, profile.tier, true));
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Quota view for the credential's owner.
    pub async fn quota(&self, credential: &Credential) -> Result<QuotaStatus, GateError> {
        let user = self.authenticate(credential).await?;
        let profile = self.read_profile(&user).await?;
        Ok(quota_status(
            (self.clock)(),
            profile.tier,
            &profile.ledger,
            &self.policy,
        ))
    }

    fn grant(
        &self,
        user: UserIdentity,
        resource: ResourceId,
        tier: Tier,
        new_session: bool,
    ) -> Grant {
        EventLogger::log_event(
            &user.id.to_string(),
            AccessEvent::Granted {
                resource: resource.to_string(),
                tier: tier.as_str().to_string(),
                new_session,
            },
        );
        Grant {
            user,
            resource,
            tier,
            new_session,
        }
    }

    async fn persist(
        &self,
        user: &UserIdentity,
        expected: LedgerRevision,
        update: LedgerUpdate,
        resource: &ResourceId,
    ) -> WriteStatus {
        let ledger = Arc::clone(&self.ledger);
        let task_user = user.clone();
        let task_resource = resource.to_string();

        // Dropping the handle on timeout detaches the task; it still logs.
        let write = tokio::spawn(async move {
            let result = ledger.compare_and_set(&task_user, &expected, &update).await;
            if let Err(e) = &result {
                EventLogger::log_event(
                    &task_user.id.to_string(),
                    AccessEvent::LedgerWriteFailed {
                        resource: task_resource,
                        error: e.to_string(),
                    },
                );
            }
            result
        });

        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(Ok(Ok(WriteOutcome::Applied))) => WriteStatus::Applied,
            Ok(Ok(Ok(WriteOutcome::Conflict))) => WriteStatus::Conflict,
            Ok(Ok(Err(_))) => WriteStatus::Unconfirmed,
            Ok(Err(join_error)) => {
                error!(user = %user.id, error = %join_error, "Ledger write task aborted");
                WriteStatus::Unconfirmed
            }
            Err(_) => {
                warn!(
                    user = %user.id,
                    timeout_ms = self.write_timeout.as_millis() as u64,
                    "Ledger write still pending; serving without it"
                );
                WriteStatus::Unconfirmed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use gamegate_core::{InMemoryLedger, LedgerSnapshot, SessionHistory, StaticIdentityVerifier};

    const TOKEN: &str = "token-1";

    struct Harness {
        service: AccessService,
        ledger: InMemoryLedger,
        user: UserIdentity,
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl Harness {
        fn set_now(&self, at: DateTime<Utc>) {
            *self.now.lock().unwrap() = at;
        }

        async fn count(&self) -> u32 {
            self.ledger.snapshot(self.user.id).await.unwrap().session_count
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
    }

    fn credential() -> Credential {
        Credential::new(TOKEN).unwrap()
    }

    async fn harness_with(
        tier: Tier,
        ledger: Arc<dyn LedgerStore>,
        store: InMemoryLedger,
    ) -> Harness {
        let verifier = StaticIdentityVerifier::new();
        let user = UserIdentity {
            id: uuid::Uuid::new_v4(),
            email: Some("player@example.com".into()),
        };
        verifier.insert_token(TOKEN, user.clone()).await;
        store.insert_profile(user.id, tier).await;

        let now = Arc::new(Mutex::new(at(1, 9, 0)));
        let clock_now = Arc::clone(&now);
        let service = AccessService::new(
            Arc::new(verifier),
            ledger,
            GameCatalog::new(["brain-games", "hiit-trainer1"]).unwrap(),
            QuotaPolicy::new(2, 15),
        )
        .with_clock(move || *clock_now.lock().unwrap());

        Harness {
            service,
            ledger: store,
            user,
            now,
        }
    }

    async fn harness(tier: Tier) -> Harness {
        let store = InMemoryLedger::new();
        harness_with(tier, Arc::new(store.clone()), store).await
    }

    #[tokio::test]
    async fn daily_scenario() {
        let h = harness(Tier::Free).await;

        let grant = h.service.request_access(&credential(), "brain-games").await.unwrap();
        assert!(grant.new_session);
        assert_eq!(h.count().await, 1);

        h.set_now(at(1, 9, 20));
        h.service.request_access(&credential(), "brain-games").await.unwrap();
        assert_eq!(h.count().await, 2);

        h.set_now(at(1, 9, 40));
        let denied = h.service.request_access(&credential(), "brain-games").await;
        assert!(matches!(denied, Err(GateError::LimitReached)));
        assert_eq!(h.count().await, 2);

        h.set_now(at(2, 9, 0));
        h.service.request_access(&credential(), "hiit-trainer1").await.unwrap();
        assert_eq!(h.count().await, 1);

        let history = h.ledger.snapshot(h.user.id).await.unwrap().session_history;
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn requests_inside_window_are_free() {
        let h = harness(Tier::Free).await;
        h.service.request_access(&credential(), "brain-games").await.unwrap();

        h.set_now(at(1, 9, 10));
        let grant = h.service.request_access(&credential(), "hiit-trainer1").await.unwrap();
        assert!(!grant.new_session);
        assert_eq!(h.count().await, 1);
    }

    #[tokio::test]
    async fn premium_never_touches_ledger() {
        let h = harness(Tier::Premium).await;
        for minute in [0, 20, 40] {
            h.set_now(at(1, 9, minute));
            let grant = h.service.request_access(&credential(), "brain-games").await.unwrap();
            assert_eq!(grant.tier, Tier::Premium);
        }
        assert_eq!(h.ledger.snapshot(h.user.id).await.unwrap().session_start, None);
    }

    #[tokio::test]
    async fn unknown_game_is_not_found_and_free() {
        let h = harness(Tier::Free).await;
        let result = h.service.request_access(&credential(), "chess").await;
        assert!(matches!(result, Err(GateError::ResourceNotFound(_))));
        let result = h.service.request_access(&credential(), "../secret").await;
        assert!(matches!(result, Err(GateError::ResourceNotFound(_))));
        assert_eq!(h.count().await, 0);
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let h = harness(Tier::Free).await;
        let result = h
            .service
            .request_access(&Credential::new("forged").unwrap(), "brain-games")
            .await;
        assert!(matches!(result, Err(GateError::Unauthorized)));
    }

    #[tokio::test]
    async fn missing_profile_is_reported() {
        let h = harness(Tier::Free).await;
        let stranger = UserIdentity {
            id: uuid::Uuid::new_v4(),
            email: None,
        };
        let verifier = StaticIdentityVerifier::new();
        verifier.insert_token("stranger", stranger).await;
        let service = AccessService::new(
            Arc::new(verifier),
            Arc::new(h.ledger.clone()),
            GameCatalog::new(["brain-games"]).unwrap(),
            QuotaPolicy::default(),
        );
        let result = service
            .request_access(&Credential::new("stranger").unwrap(), "brain-games")
            .await;
        assert!(matches!(result, Err(GateError::ProfileNotFound)));
    }

    #[tokio::test]
    async fn failed_write_still_grants() {
        let h = harness(Tier::Free).await;
        h.ledger.set_write_failure(true);

        let grant = h.service.request_access(&credential(), "brain-games").await.unwrap();
        assert!(grant.new_session);
        assert_eq!(h.ledger.snapshot(h.user.id).await.unwrap().session_start, None);
    }

    /// Delays every write past any reasonable timeout.
    struct SlowLedger(InMemoryLedger);

    #[async_trait]
    impl LedgerStore for SlowLedger {
        async fn read(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError> {
            self.0.read(user).await
        }

        async fn compare_and_set(
            &self,
            user: &UserIdentity,
            expected: &LedgerRevision,
            update: &LedgerUpdate,
        ) -> Result<WriteOutcome, GateError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.0.compare_and_set(user, expected, update).await
        }
    }

    #[tokio::test]
    async fn slow_write_does_not_block_grant() {
        let store = InMemoryLedger::new();
        let mut h = harness_with(Tier::Free, Arc::new(SlowLedger(store.clone())), store).await;
        h.service = h.service.with_write_timeout(Duration::from_millis(10));

        let grant = h.service.request_access(&credential(), "brain-games").await.unwrap();
        assert!(grant.new_session);

        // The detached write lands afterwards.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(h.count().await, 1);
    }

    /// Lets a competing writer start a session between our read and our write.
    struct RacingLedger {
        inner: InMemoryLedger,
        competitor: LedgerSnapshot,
        raced: AtomicBool,
    }

    #[async_trait]
    impl LedgerStore for RacingLedger {
        async fn read(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError> {
            self.inner.read(user).await
        }

        async fn compare_and_set(
            &self,
            user: &UserIdentity,
            expected: &LedgerRevision,
            update: &LedgerUpdate,
        ) -> Result<WriteOutcome, GateError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                self.inner.set_ledger(user.id, self.competitor.clone()).await;
            }
            self.inner.compare_and_set(user, expected, update).await
        }
    }

    #[tokio::test]
    async fn lost_race_is_re_decided() {
        let store = InMemoryLedger::new();

        // One session used this morning; a competing request claims the
        // second one twenty minutes before ours lands.
        let mut history = SessionHistory::new();
        history.record(at(1, 9, 0).date_naive(), 2);
        let racing = RacingLedger {
            inner: store.clone(),
            competitor: LedgerSnapshot {
                session_start: Some(at(1, 10, 0)),
                session_count: 2,
                session_history: history,
            },
            raced: AtomicBool::new(false),
        };
        let h = harness_with(Tier::Free, Arc::new(racing), store).await;
        h.ledger
            .set_ledger(
                h.user.id,
                LedgerSnapshot {
                    session_start: Some(at(1, 8, 0)),
                    session_count: 1,
                    session_history: SessionHistory::new(),
                },
            )
            .await;
        h.set_now(at(1, 10, 20));

        let result = h.service.request_access(&credential(), "brain-games").await;
        assert!(matches!(result, Err(GateError::LimitReached)));
        assert_eq!(h.count().await, 2);
    }

    /// Every conditional write loses.
    struct ContestedLedger {
        inner: InMemoryLedger,
        writes: AtomicU32,
    }

    #[async_trait]
    impl LedgerStore for ContestedLedger {
        async fn read(&self, user: &UserIdentity) -> Result<ProfileRecord, GateError> {
            self.inner.read(user).await
        }

        async fn compare_and_set(
            &self,
            _user: &UserIdentity,
            _expected: &LedgerRevision,
            _update: &LedgerUpdate,
        ) -> Result<WriteOutcome, GateError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(WriteOutcome::Conflict)
        }
    }

    #[tokio::test]
    async fn endless_conflicts_serve_on_last_decision() {
        let store = InMemoryLedger::new();
        let contested = Arc::new(ContestedLedger {
            inner: store.clone(),
            writes: AtomicU32::new(0),
        });
        let h = harness_with(Tier::Free, contested.clone(), store).await;

        let grant = h.service.request_access(&credential(), "brain-games").await.unwrap();
        assert!(grant.new_session);
        assert_eq!(contested.writes.load(Ordering::SeqCst), MAX_CLAIM_ATTEMPTS);
        assert_eq!(h.count().await, 0);
    }

    #[tokio::test]
    async fn quota_reflects_ledger() {
        let h = harness(Tier::Free).await;
        h.service.request_access(&credential(), "brain-games").await.unwrap();

        h.set_now(at(1, 9, 5));
        let status = h.service.quota(&credential()).await.unwrap();
        assert_eq!(status.sessions_today, 1);
        assert_eq!(status.remaining_sessions, Some(1));
        assert!(status.session_active);
        assert_eq!(status.session_ends_at, Some(at(1, 9, 0) + ChronoDuration::minutes(15)));
    }
}
