//! `gamegate-config`: gamegate runtime configuration.
//!
//! Provides:
//! - Typed config schema (server, Supabase, ledger, quota, content, cookies, logging)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Config redaction for safe display
//! - Default value application and validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, collect_referenced_vars, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_raw_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::GamegateConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Load a config file and run it through substitution, overrides, defaults
/// and validation, using the process environment.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<GamegateConfig> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

/// Same as [`load_and_prepare`] with an explicit environment.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<GamegateConfig> {
    let raw = load_raw_config(path).await?;

    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: GamegateConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gamegate-{tag}-{}.yaml", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn full_pipeline_resolves_overrides_and_defaults() {
        let path = temp_path("pipeline");
        tokio::fs::write(
            &path,
            "supabase:\n  url: https://${PROJECT}.supabase.co\n  anonKey: anon\n\
             quota:\n  maxSessionsPerDay: 4\n",
        )
        .await
        .unwrap();

        let env: HashMap<String, String> = [
            ("PROJECT", "abc"),
            ("SUPABASE_SERVICE_ROLE_KEY", "svc"),
            ("GAMEGATE_PORT", "9090"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = load_and_prepare_with(&path, &env).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(config.supabase.url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(config.supabase.service_role_key.as_deref(), Some("svc"));
        assert_eq!(config.server.port, Some(9090));
        assert_eq!(config.quota.max_sessions_per_day, Some(4));
        assert_eq!(config.quota.session_window_minutes, Some(15));
        assert_eq!(config.ledger.table.as_deref(), Some("profiles"));
    }

    #[tokio::test]
    async fn missing_reference_fails() {
        let path = temp_path("missing-var");
        tokio::fs::write(&path, "supabase:\n  url: ${NOT_SET_ANYWHERE}\n")
            .await
            .unwrap();
        let result = load_and_prepare_with(&path, &HashMap::new()).await;
        tokio::fs::remove_file(&path).await.ok();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let config = load_and_prepare_with(&temp_path("absent"), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(config.server.address(), "0.0.0.0:8080");
    }
}
