//! Config redaction: safe-to-print config snapshots with secrets masked.

use serde_json::Value;

/// Keys whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "anonKey",
    "anon_key",
    "serviceRoleKey",
    "service_role_key",
    "apiKey",
    "api_key",
    "accessToken",
    "access_token",
    "refreshToken",
    "refresh_token",
    "token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every sensitive string.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if is_sensitive_key(key) && !s.is_empty() {
        // Preserve a short prefix as a hint.
        let hint = if s.chars().count() > 8 {
            format!("{}***", s.chars().take(4).collect::<String>())
        } else {
            "***".to_string()
        };
        return Value::String(hint);
    }
    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Collect all field paths that would be redacted.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_service_role_key() {
        let v = json!({
            "supabase": {
                "serviceRoleKey": "eyJhbGciOiJIUzI1NiJ9.secret",
                "url": "https://x.supabase.co"
            }
        });
        let redacted = redact(&v);
        let key = redacted["supabase"]["serviceRoleKey"].as_str().unwrap();
        assert_eq!(key, "eyJh***");
        assert_eq!(redacted["supabase"]["url"], "https://x.supabase.co");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let redacted = redact(&json!({"anonKey": "abc"}));
        assert_eq!(redacted["anonKey"], "***");
    }

    #[test]
    fn collects_paths() {
        let v = json!({"supabase": {"anonKey": "a", "serviceRoleKey": "b", "url": "u"}});
        let mut paths = collect_redacted_paths(&v);
        paths.sort();
        assert_eq!(paths, vec!["supabase.anonKey", "supabase.serviceRoleKey"]);
    }
}
