//! gamegate configuration schema.
//!
//! Typed for serde YAML/JSON deserialization with camelCase keys. Every leaf
//! is optional in the file; `defaults::apply_all_defaults` fills the gaps and
//! the accessors fall back to the same defaults.

use serde::{Deserialize, Serialize};

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for gamegate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamegateConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Supabase project (identity backend + profile store)
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Quota ledger persistence
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Free-tier quota
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Gated game pages
    #[serde(default)]
    pub content: ContentConfig,

    /// Session cookies
    #[serde(default)]
    pub cookies: CookieConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// CORS origins; empty means permissive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind(), self.port())
    }
}

// ---------------------------------------------------------------------------
// Supabase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupabaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Public key sent as `apikey` on auth calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    /// Privileged key for profile reads/writes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_role_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl SupabaseConfig {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_SUPABASE_TIMEOUT_MS)
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// How long a request waits on its ledger write before serving anyway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout_ms: Option<u64>,
}

impl LedgerConfig {
    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or(DEFAULT_LEDGER_TABLE)
    }

    pub fn write_timeout_ms(&self) -> u64 {
        self.write_timeout_ms.unwrap_or(DEFAULT_LEDGER_WRITE_TIMEOUT_MS)
    }
}

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sessions_per_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_window_minutes: Option<u32>,
}

impl QuotaConfig {
    pub fn max_sessions_per_day(&self) -> u32 {
        self.max_sessions_per_day.unwrap_or(DEFAULT_MAX_SESSIONS_PER_DAY)
    }

    pub fn session_window_minutes(&self) -> u32 {
        self.session_window_minutes.unwrap_or(DEFAULT_SESSION_WINDOW_MINUTES)
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentConfig {
    /// Directory holding `<slug>.html` files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Slugs that may be served
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<String>>,
}

impl ContentConfig {
    pub fn dir(&self) -> &str {
        self.dir.as_deref().unwrap_or(DEFAULT_CONTENT_DIR)
    }

    pub fn games(&self) -> Vec<String> {
        match &self.games {
            Some(games) => games.clone(),
            None => DEFAULT_GAMES.iter().map(|g| g.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_secs: Option<u64>,
}

impl CookieConfig {
    pub fn access_token_name(&self) -> &str {
        self.access_token_name.as_deref().unwrap_or(DEFAULT_ACCESS_COOKIE)
    }

    pub fn refresh_token_name(&self) -> &str {
        self.refresh_token_name.as_deref().unwrap_or(DEFAULT_REFRESH_COOKIE)
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs.unwrap_or(DEFAULT_COOKIE_MAX_AGE_SECS)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// JSON console output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
