//! Main HTTP Gateway Server.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, instrument, warn};

use crate::headers::with_security_headers;
use crate::state::AppState;
use crate::{auth_api, games_api, health_api, quota_api};

/// All routes, with baseline security headers.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/health", get(health_api::health))
        .route("/api/games", get(games_api::list_games))
        .route("/api/games/:slug", get(games_api::get_game))
        .route("/api/quota", get(quota_api::get_quota))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/signup", post(auth_api::signup))
        .route("/api/auth/set-cookie", post(auth_api::set_cookie))
        .route("/api/auth/logout", get(auth_api::logout).post(auth_api::logout))
        .with_state(state);

    with_security_headers(router)
}

/// CORS for the configured origins; permissive when none are listed.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Starts the Axum HTTP server and runs until Ctrl-C or SIGTERM.
#[instrument(skip(state, allowed_origins))]
pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    allowed_origins: &[String],
) -> Result<()> {
    let app = build_router(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
