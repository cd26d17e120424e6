use thiserror::Error;

/// Top-level error type for gamegate request handling.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("not authenticated")]
    Unauthorized,

    #[error("game not found: {0}")]
    ResourceNotFound(String),

    #[error("free session limit reached")]
    LimitReached,

    #[error("profile not found")]
    ProfileNotFound,

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("content error: {0}")]
    Content(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GateError {
    /// Whether this error came from a collaborator being unreachable rather
    /// than from the request itself.
    pub fn is_upstream(&self) -> bool {
        matches!(self, GateError::UpstreamUnavailable(_) | GateError::Other(_))
    }
}
