//! Config validation: checks with user-friendly error messages.

use std::path::Path;

use gamegate_core::ResourceId;
use thiserror::Error;

use crate::schema::GamegateConfig;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &GamegateConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_supabase(config, &mut report);
    validate_quota(config, &mut report);
    validate_content(config, &mut report);
    report
}

fn validate_server(config: &GamegateConfig, report: &mut ValidationReport) {
    if config.server.port == Some(0) {
        report.error("server.port", "port must be > 0");
    }
}

fn validate_supabase(config: &GamegateConfig, report: &mut ValidationReport) {
    let supabase = &config.supabase;
    let blank = |v: &Option<String>| v.as_deref().map(str::trim).map(str::is_empty).unwrap_or(true);

    match supabase.url.as_deref().map(str::trim) {
        None | Some("") => report.error("supabase.url", "Supabase URL is required"),
        Some(url) if url.starts_with("http://") => {
            report.warn("supabase.url", "Supabase URL is not https; tokens travel in clear text")
        }
        Some(url) if !url.starts_with("https://") => {
            report.error("supabase.url", format!("'{url}' is not an http(s) URL"))
        }
        Some(_) => {}
    }
    if blank(&supabase.anon_key) {
        report.error("supabase.anonKey", "Supabase anon key is required");
    }
    if blank(&supabase.service_role_key) {
        report.error("supabase.serviceRoleKey", "Supabase service role key is required");
    }
}

fn validate_quota(config: &GamegateConfig, report: &mut ValidationReport) {
    if config.quota.max_sessions_per_day == Some(0) {
        report.error("quota.maxSessionsPerDay", "maxSessionsPerDay must be >= 1");
    }
    if config.quota.session_window_minutes == Some(0) {
        report.error("quota.sessionWindowMinutes", "sessionWindowMinutes must be >= 1");
    }
}

fn validate_content(config: &GamegateConfig, report: &mut ValidationReport) {
    let games = config.content.games();
    if games.is_empty() {
        report.error("content.games", "At least one game must be listed");
    }
    for (i, slug) in games.iter().enumerate() {
        if !ResourceId::is_valid_slug(slug) {
            report.error(
                format!("content.games[{i}]"),
                format!("'{slug}' is not a valid slug; use letters, digits, '-' and '_'"),
            );
        }
    }

    let dir = config.content.dir();
    if !Path::new(dir).is_dir() {
        report.warn("content.dir", format!("Content directory '{dir}' does not exist"));
    }
}
