//! Access Event Logger
//!
//! One structured record per access decision or ledger incident, emitted on
//! the `access_events` target so it can be filtered or routed separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

pub const ACCESS_EVENT_TARGET: &str = "access_events";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEvent {
    Granted {
        resource: String,
        tier: String,
        /// Whether this request started a new session window.
        new_session: bool,
    },
    Denied {
        resource: String,
        reason: String,
    },
    LedgerWriteFailed {
        resource: String,
        error: String,
    },
    LedgerConflict {
        resource: String,
        attempt: u32,
    },
}

impl AccessEvent {
    fn is_incident(&self) -> bool {
        matches!(self, Self::LedgerWriteFailed { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AccessEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs an access event, redacting free-form text first.
    pub fn log_event(user_id: &str, event: AccessEvent) -> EventLogEntry {
        let event = match event {
            AccessEvent::LedgerWriteFailed { resource, error } => AccessEvent::LedgerWriteFailed {
                resource,
                error: redact_sensitive_data(&error),
            },
            other => other,
        };

        let entry = EventLogEntry {
            user_id: user_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if entry.event.is_incident() {
            warn!(target: ACCESS_EVENT_TARGET, event = %json, "Access event");
        } else {
            info!(target: ACCESS_EVENT_TARGET, event = %json, "Access event");
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failure_error_is_redacted() {
        let entry = EventLogger::log_event(
            "u1",
            AccessEvent::LedgerWriteFailed {
                resource: "brain-games".into(),
                error: "rejected Bearer abc.def.ghi".into(),
            },
        );
        match entry.event {
            AccessEvent::LedgerWriteFailed { error, .. } => {
                assert_eq!(error, "rejected [REDACTED_TOKEN]")
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let entry = EventLogger::log_event(
            "u2",
            AccessEvent::Denied {
                resource: "hiit-trainer1".into(),
                reason: "LIMIT_REACHED".into(),
            },
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event"]["type"], "denied");
        assert_eq!(value["event"]["reason"], "LIMIT_REACHED");
        assert_eq!(value["user_id"], "u2");
    }
}
