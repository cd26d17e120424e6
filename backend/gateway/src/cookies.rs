//! Session cookie formatting and parsing.

use axum::http::{HeaderMap, header::COOKIE};
use gamegate_core::SessionTokens;

const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=Strict; Path=/";

/// Names and lifetime of the auth cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub access_name: String,
    pub refresh_name: String,
    pub max_age_secs: u64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            access_name: "sb-access-token".into(),
            refresh_name: "sb-refresh-token".into(),
            max_age_secs: 60 * 60 * 24 * 7,
        }
    }
}

impl CookieSettings {
    /// `Set-Cookie` value storing `value` under `name`.
    pub fn session_cookie(&self, name: &str, value: &str) -> String {
        format!("{name}={value}; {COOKIE_ATTRIBUTES}; Max-Age={}", self.max_age_secs)
    }

    /// `Set-Cookie` value that expires `name` immediately.
    pub fn expired_cookie(&self, name: &str) -> String {
        format!("{name}=; {COOKIE_ATTRIBUTES}; Max-Age=0")
    }

    /// Cookies for a freshly issued session.
    pub fn for_session(&self, tokens: &SessionTokens) -> Vec<String> {
        let mut cookies = vec![self.session_cookie(&self.access_name, &tokens.access_token)];
        if let Some(refresh) = &tokens.refresh_token {
            cookies.push(self.session_cookie(&self.refresh_name, refresh));
        }
        cookies
    }

    /// Cookies clearing both tokens.
    pub fn cleared(&self) -> Vec<String> {
        vec![
            self.expired_cookie(&self.access_name),
            self.expired_cookie(&self.refresh_name),
        ]
    }
}

/// Whether `value` can be stored in a cookie without encoding.
pub fn is_cookie_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

/// Value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_attributes() {
        let cookie = CookieSettings::default().session_cookie("sb-access-token", "abc");
        assert_eq!(
            cookie,
            "sb-access-token=abc; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=604800"
        );
    }

    #[test]
    fn cleared_cookies_expire_both() {
        let cleared = CookieSettings::default().cleared();
        assert_eq!(cleared.len(), 2);
        assert!(cleared[0].starts_with("sb-access-token=;"));
        assert!(cleared[1].starts_with("sb-refresh-token=;"));
        assert!(cleared.iter().all(|c| c.ends_with("Max-Age=0")));
    }

    #[test]
    fn session_without_refresh_sets_one_cookie() {
        let tokens = SessionTokens {
            access_token: "a".into(),
            refresh_token: None,
            expires_in: None,
        };
        assert_eq!(CookieSettings::default().for_session(&tokens).len(), 1);
    }

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; sb-access-token=tok123"));
        headers.append(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(read_cookie(&headers, "sb-access-token"), Some("tok123"));
        assert_eq!(read_cookie(&headers, "other"), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn rejects_unsafe_values() {
        assert!(is_cookie_safe("eyJhbGci.eyJzdWIi.sig-_"));
        assert!(!is_cookie_safe("a; Path=/evil"));
        assert!(!is_cookie_safe("with space"));
        assert!(!is_cookie_safe(""));
    }
}
