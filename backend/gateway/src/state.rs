//! Shared application state.

use std::sync::Arc;

use gamegate_core::AccountService;

use crate::access::AccessService;
use crate::content::ContentStore;
use crate::cookies::CookieSettings;

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub access: AccessService,
    pub accounts: Arc<dyn AccountService>,
    pub cookies: CookieSettings,
    pub content: ContentStore,
}

impl AppState {
    pub fn new(
        access: AccessService,
        accounts: Arc<dyn AccountService>,
        cookies: CookieSettings,
        content: ContentStore,
    ) -> Self {
        Self {
            access,
            accounts,
            cookies,
            content,
        }
    }
}
