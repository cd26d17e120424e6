//! `gamegate serve`: wire config into collaborators and run the gateway.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use gamegate_config::{redact, validate, GamegateConfig};
use gamegate_core::{GameCatalog, QuotaPolicy};
use gamegate_gateway::{start_server, AccessService, AppState, ContentStore, CookieSettings};
use gamegate_logging::init_logger;
use gamegate_supabase::{ProfileStore, SupabaseAuth, SupabaseClient};
use tracing::{debug, error, info, warn};

use crate::resolve_config_path;

pub async fn run(config_path: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let path = resolve_config_path(config_path);
    let mut config = gamegate_config::load_and_prepare(&path).await?;
    if let Some(port) = port {
        config.server.port = Some(port);
    }

    let log_dir = config.logging.dir.as_deref().map(Path::new);
    init_logger(
        config.logging.level(),
        log_dir,
        config.logging.json.unwrap_or(false),
    )?;

    // Re-run now that the logger is installed, so the report is visible.
    let report = validate(&config);
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for err in &report.errors {
        error!(path = %err.path, message = %err.message, "Config error");
    }
    if !report.is_valid() {
        bail!("Refusing to start with {} config error(s)", report.errors.len());
    }

    if let Ok(redacted) = serde_json::to_value(&config).map(|v| redact(&v)) {
        debug!(config = %redacted, "Effective config");
    }

    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.address()))?;

    info!(
        addr = %addr,
        config = %path.display(),
        games = config.content.games().len(),
        "Starting gamegate"
    );

    let state = build_state(&config)?;
    start_server(addr, state, &config.server.allowed_origins).await
}

/// Build the gateway state from a validated config.
pub fn build_state(config: &GamegateConfig) -> Result<AppState> {
    let supabase = &config.supabase;
    let client = SupabaseClient::new(
        supabase.url.clone().context("supabase.url is required")?,
        supabase.anon_key.clone().context("supabase.anonKey is required")?,
        supabase
            .service_role_key
            .clone()
            .context("supabase.serviceRoleKey is required")?,
        Duration::from_millis(supabase.timeout_ms()),
    )?;

    let auth = Arc::new(SupabaseAuth::new(client.clone()));
    let ledger = Arc::new(ProfileStore::new(client).with_table(config.ledger.table()));

    let catalog = GameCatalog::new(config.content.games()).context("Invalid game catalog")?;
    let policy = QuotaPolicy::new(
        config.quota.max_sessions_per_day(),
        config.quota.session_window_minutes(),
    );

    let access = AccessService::new(auth.clone(), ledger, catalog, policy)
        .with_write_timeout(Duration::from_millis(config.ledger.write_timeout_ms()));

    let cookies = CookieSettings {
        access_name: config.cookies.access_token_name().to_string(),
        refresh_name: config.cookies.refresh_token_name().to_string(),
        max_age_secs: config.cookies.max_age_secs(),
    };

    Ok(AppState::new(
        access,
        auth,
        cookies,
        ContentStore::new(config.content.dir()),
    ))
}
