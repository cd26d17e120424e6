//! Environment variable handling for config values.
//!
//! String values may reference `${VAR_NAME}` (uppercase `[A-Z_][A-Z0-9_]*`),
//! resolved at load time; `$${VAR}` escapes to a literal `${VAR}`. A small
//! set of well-known variables also override fields directly.

use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::GamegateConfig;

/// `${VAR}`, optionally preceded by an escaping `$`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

/// Collect all env var names referenced in a config value tree.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => out.extend(
                ENV_VAR_PATTERN
                    .captures_iter(s)
                    .filter(|caps| caps[1].is_empty())
                    .map(|caps| caps[2].to_string()),
            ),
            Value::Array(arr) => arr.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut vars = Vec::new();
    walk(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

/// Apply direct overrides from well-known variables.
pub fn apply_env_overrides(
    mut config: GamegateConfig,
    env: &HashMap<String, String>,
) -> GamegateConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(bind) = get("GAMEGATE_BIND") {
        config.server.bind = Some(bind);
    }
    if let Some(port) = get("GAMEGATE_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = Some(port),
            Err(e) => warn!("Invalid GAMEGATE_PORT value {port:?}: {e}"),
        }
    }
    if let Some(url) = get("SUPABASE_URL") {
        config.supabase.url = Some(url);
    }
    if let Some(key) = get("SUPABASE_ANON_KEY") {
        config.supabase.anon_key = Some(key);
    }
    if let Some(key) = get("SUPABASE_SERVICE_ROLE_KEY") {
        debug!("Using service role key from environment");
        config.supabase.service_role_key = Some(key);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"supabase": {"serviceRoleKey": "${SERVICE_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("SERVICE_KEY", "svc")])).unwrap();
        assert_eq!(result["supabase"]["serviceRoleKey"], "svc");
    }

    #[test]
    fn missing_var_names_the_path() {
        let v = json!({"supabase": {"url": "${SUPABASE_URL}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("SUPABASE_URL"));
        assert!(err.contains("supabase.url"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "cost $${PRICE}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "cost ${PRICE}");
    }

    #[test]
    fn substitutes_inside_larger_string() {
        let v = json!({"url": "https://${PROJECT}.supabase.co"});
        let result = resolve_env_vars_with(&v, &env(&[("PROJECT", "abc")])).unwrap();
        assert_eq!(result["url"], "https://abc.supabase.co");
    }

    #[test]
    fn collects_unescaped_vars_only() {
        let v = json!({"a": "${FOO}", "b": ["${BAR}", "$${BAZ}"]});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }

    #[test]
    fn overrides_port_and_keys() {
        let cfg = apply_env_overrides(
            GamegateConfig::default(),
            &env(&[
                ("GAMEGATE_PORT", "9090"),
                ("SUPABASE_URL", "https://x.supabase.co"),
                ("SUPABASE_SERVICE_ROLE_KEY", "svc"),
            ]),
        );
        assert_eq!(cfg.server.port, Some(9090));
        assert_eq!(cfg.supabase.url.as_deref(), Some("https://x.supabase.co"));
        assert_eq!(cfg.supabase.service_role_key.as_deref(), Some("svc"));
    }

    #[test]
    fn bad_port_override_is_ignored() {
        let cfg =
            apply_env_overrides(GamegateConfig::default(), &env(&[("GAMEGATE_PORT", "http")]));
        assert_eq!(cfg.server.port, None);
    }
}
