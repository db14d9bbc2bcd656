//! Axum extractor for authenticated routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// The authenticated caller, extracted from a verified `Bearer` token.
///
/// Using this extractor makes a route require authentication: missing or
/// invalid credentials reject the request with the matching 401 response.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Numeric user ID from the `sub` claim.
    pub user_id: i64,
    /// Role from the `role` claim.
    pub role: String,
}

impl CurrentUser {
    /// Returns `true` if the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = state.authenticator.authenticate(&parts.headers)?;
        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
