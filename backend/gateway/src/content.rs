//! Gated page storage.

use std::path::{Path, PathBuf};

use axum::response::{IntoResponse, Response};
use gamegate_core::{GateError, ResourceId};
use tokio::fs;
use tracing::error;

use crate::headers::gated_content_headers;

/// Directory of `<slug>.html` pages.
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the page for `resource`. Only catalog slugs reach this.
    pub async fn load(&self, resource: &ResourceId) -> Result<String, GateError> {
        let path = self.dir.join(format!("{resource}.html"));
        fs::read_to_string(&path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to read game page");
            GateError::Content(e.to_string())
        })
    }
}

/// A page body with the gated-content headers.
pub fn html_response(html: String) -> Response {
    (gated_content_headers(), html).into_response()
}
