//! Response header policy.

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline'; \
    style-src 'self' 'unsafe-inline'; \
    frame-ancestors 'self';";
pub const GATED_CACHE_CONTROL: &str = "no-store, private";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Headers on every gated page.
pub fn gated_content_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE)),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
        (header::CACHE_CONTROL, HeaderValue::from_static(GATED_CACHE_CONTROL)),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
    ]
}

/// Baseline security headers, added to any response that lacks them.
pub fn with_security_headers(router: Router) -> Router {
    let baseline = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
        (
            HeaderName::from_static("permissions-policy"),
            "geolocation=(), microphone=(), camera=()",
        ),
    ];

    baseline.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ))
    })
}
