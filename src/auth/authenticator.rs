//! The [`Authenticator`] seam and its JWT-backed implementation.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use super::jwt::{Claims, JwtSigner};
use crate::error::GatewayError;

/// Authenticates an inbound request from its headers.
///
/// Implementations must distinguish "no credentials supplied"
/// ([`GatewayError::NoCredentials`]) from hard failures: the realtime
/// identity resolver falls back to a guest identity only on the former.
pub trait Authenticator: Send + Sync {
    /// Validates the request's credentials and returns the token claims.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NoCredentials`] when no `Authorization` header is
    ///   present.
    /// - [`GatewayError::UnexpectedAuthHeader`] when the header is present
    ///   but not a two-part `Bearer <token>` value.
    /// - [`GatewayError::InvalidToken`] when the token fails validation.
    fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, GatewayError>;
}

/// [`Authenticator`] backed by [`JwtSigner`] verification.
#[derive(Debug, Clone)]
pub struct JwtAuthenticator {
    signer: Arc<JwtSigner>,
}

impl JwtAuthenticator {
    /// Creates an authenticator sharing the gateway's signer.
    #[must_use]
    pub fn new(signer: Arc<JwtSigner>) -> Self {
        Self { signer }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, GatewayError> {
        let Some(header) = headers.get(AUTHORIZATION) else {
            return Err(GatewayError::NoCredentials);
        };
        let value = header
            .to_str()
            .map_err(|_| GatewayError::UnexpectedAuthHeader)?;

        let mut parts = value.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("Bearer"), Some(token), None) => self.signer.verify(token),
            _ => Err(GatewayError::UnexpectedAuthHeader),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authenticator() -> (JwtAuthenticator, Arc<JwtSigner>) {
        let signer = Arc::new(JwtSigner::new("test-secret", "pulse-gateway", 3600));
        (JwtAuthenticator::new(Arc::clone(&signer)), signer)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Ok(value) = HeaderValue::from_str(value) else {
            panic!("invalid header value");
        };
        headers.insert(AUTHORIZATION, value);
        headers
    }

    #[test]
    fn missing_header_is_no_credentials() {
        let (auth, _) = authenticator();
        assert!(matches!(
            auth.authenticate(&HeaderMap::new()),
            Err(GatewayError::NoCredentials)
        ));
    }

    #[test]
    fn malformed_header_is_unexpected() {
        let (auth, _) = authenticator();
        assert!(matches!(
            auth.authenticate(&headers_with("Bearer")),
            Err(GatewayError::UnexpectedAuthHeader)
        ));
        assert!(matches!(
            auth.authenticate(&headers_with("Basic dXNlcjpwYXNz")),
            Err(GatewayError::UnexpectedAuthHeader)
        ));
        assert!(matches!(
            auth.authenticate(&headers_with("Bearer a b")),
            Err(GatewayError::UnexpectedAuthHeader)
        ));
    }

    #[test]
    fn invalid_token_is_rejected() {
        let (auth, _) = authenticator();
        assert!(matches!(
            auth.authenticate(&headers_with("Bearer bogus")),
            Err(GatewayError::InvalidToken)
        ));
    }

    #[test]
    fn valid_bearer_token_yields_claims() {
        let (auth, signer) = authenticator();
        let Ok(token) = signer.sign(7, "admin") else {
            panic!("signing failed");
        };
        let Ok(claims) = auth.authenticate(&headers_with(&format!("Bearer {token}"))) else {
            panic!("authentication failed");
        };
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "admin");
    }
}
