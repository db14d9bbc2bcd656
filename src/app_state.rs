//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::realtime::RealtimeHub;
use crate::service::UserService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// User service for account and profile logic.
    pub users: Arc<UserService>,
    /// Realtime hub: connection registry and dispatch API.
    pub realtime: Arc<RealtimeHub>,
    /// Authenticator consumed by the `CurrentUser` extractor.
    pub authenticator: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("users", &self.users)
            .field("realtime", &self.realtime)
            .finish_non_exhaustive()
    }
}
