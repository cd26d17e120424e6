//! Config defaults: applies default values to parsed config.

use crate::schema::GamegateConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default Supabase request timeout.
pub const DEFAULT_SUPABASE_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_LEDGER_TABLE: &str = "profiles";

/// Default wait on a ledger write before the request is served anyway.
pub const DEFAULT_LEDGER_WRITE_TIMEOUT_MS: u64 = 2_000;

pub const DEFAULT_MAX_SESSIONS_PER_DAY: u32 = 2;
pub const DEFAULT_SESSION_WINDOW_MINUTES: u32 = 15;

pub const DEFAULT_CONTENT_DIR: &str = "private-games";
pub const DEFAULT_GAMES: &[&str] = &["brain-games", "hiit-trainer1"];

pub const DEFAULT_ACCESS_COOKIE: &str = "sb-access-token";
pub const DEFAULT_REFRESH_COOKIE: &str = "sb-refresh-token";

/// Seven days.
pub const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: GamegateConfig) -> GamegateConfig {
    let config = apply_server_defaults(config);
    let config = apply_supabase_defaults(config);
    let config = apply_ledger_defaults(config);
    let config = apply_quota_defaults(config);
    let config = apply_content_defaults(config);
    let config = apply_cookie_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: GamegateConfig) -> GamegateConfig {
    let server = &mut config.server;
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_supabase_defaults(mut config: GamegateConfig) -> GamegateConfig {
    config.supabase.timeout_ms.get_or_insert(DEFAULT_SUPABASE_TIMEOUT_MS);
    config
}

fn apply_ledger_defaults(mut config: GamegateConfig) -> GamegateConfig {
    let ledger = &mut config.ledger;
    ledger.table.get_or_insert_with(|| DEFAULT_LEDGER_TABLE.to_string());
    ledger.write_timeout_ms.get_or_insert(DEFAULT_LEDGER_WRITE_TIMEOUT_MS);
    config
}

fn apply_quota_defaults(mut config: GamegateConfig) -> GamegateConfig {
    let quota = &mut config.quota;
    quota.max_sessions_per_day.get_or_insert(DEFAULT_MAX_SESSIONS_PER_DAY);
    quota.session_window_minutes.get_or_insert(DEFAULT_SESSION_WINDOW_MINUTES);
    config
}

fn apply_content_defaults(mut config: GamegateConfig) -> GamegateConfig {
    let content = &mut config.content;
    content.dir.get_or_insert_with(|| DEFAULT_CONTENT_DIR.to_string());
    content
        .games
        .get_or_insert_with(|| DEFAULT_GAMES.iter().map(|g| g.to_string()).collect());
    config
}

fn apply_cookie_defaults(mut config: GamegateConfig) -> GamegateConfig {
    let cookies = &mut config.cookies;
    cookies
        .access_token_name
        .get_or_insert_with(|| DEFAULT_ACCESS_COOKIE.to_string());
    cookies
        .refresh_token_name
        .get_or_insert_with(|| DEFAULT_REFRESH_COOKIE.to_string());
    cookies.max_age_secs.get_or_insert(DEFAULT_COOKIE_MAX_AGE_SECS);
    config
}

fn apply_logging_defaults(mut config: GamegateConfig) -> GamegateConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::QuotaConfig;

    #[test]
    fn fills_quota_defaults() {
        let cfg = apply_all_defaults(GamegateConfig::default());
        assert_eq!(cfg.quota.max_sessions_per_day, Some(DEFAULT_MAX_SESSIONS_PER_DAY));
        assert_eq!(cfg.quota.session_window_minutes, Some(DEFAULT_SESSION_WINDOW_MINUTES));
        assert_eq!(cfg.content.games.unwrap().len(), DEFAULT_GAMES.len());
    }

    #[test]
    fn does_not_override_user_set_quota() {
        let cfg = GamegateConfig {
            quota: QuotaConfig {
                max_sessions_per_day: Some(5),
                session_window_minutes: None,
            },
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.quota.max_sessions_per_day, Some(5));
        assert_eq!(cfg.quota.session_window_minutes, Some(DEFAULT_SESSION_WINDOW_MINUTES));
    }

    #[test]
    fn empty_game_list_is_kept() {
        let mut cfg = GamegateConfig::default();
        cfg.content.games = Some(Vec::new());
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.content.games, Some(Vec::new()));
    }
}
