//! Telemetry and structured logging for gamegate.
//!
//! Handles log redaction, JSON output, file rotation, and access-decision event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ACCESS_EVENT_TARGET, AccessEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
