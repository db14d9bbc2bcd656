//! Logical identities, device keys, and the identity resolver.
//!
//! Every live connection is keyed by a [`Identity`] (one per human or
//! guest session) and a [`DeviceId`] (one per tab/socket under that
//! identity). Identities are process-scoped: they are not stable across
//! restarts and reconnecting clients simply re-register.

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use rand::Rng;

use crate::auth::Authenticator;
use crate::error::GatewayError;

/// Mixed-case ASCII letters used for guest and device token suffixes.
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random suffix in guest identities and device IDs.
const TOKEN_LEN: usize = 8;

/// Generates a random token of `len` mixed-case letters.
///
/// Collision-resistant enough to disambiguate registry keys; not a
/// security boundary.
#[must_use]
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_ALPHABET.len());
            *TOKEN_ALPHABET.get(idx).unwrap_or(&b'a') as char
        })
        .collect()
}

/// Stable key for one user or guest session, independent of device count.
///
/// `"user-<id>"` for authenticated callers, `"guest-<token>"` for
/// anonymous ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Identity for an authenticated user.
    #[must_use]
    pub fn user(user_id: i64) -> Self {
        Self(format!("user-{user_id}"))
    }

    /// Mints a fresh throwaway guest identity.
    #[must_use]
    pub fn guest() -> Self {
        Self(format!("guest-{}", random_token(TOKEN_LEN)))
    }

    /// Returns `true` for guest identities.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0.starts_with("guest-")
    }

    /// The identity as a string key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Key for one physical connection under an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Derives the device ID for a new connection under `identity`.
    ///
    /// Authenticated identities get `"<identity>-<token>"` so several
    /// devices can coexist; a guest's lone connection reuses the identity
    /// string itself.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_guest() {
            Self(identity.as_str().to_string())
        } else {
            Self(format!("{identity}-{}", random_token(TOKEN_LEN)))
        }
    }

    /// The device ID as a string key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Derives a logical identity from an inbound connection request.
///
/// Delegates credential checks to the [`Authenticator`]; only the
/// distinguished "no credentials" outcome falls back to a guest identity.
#[derive(Clone)]
pub struct IdentityResolver {
    authenticator: Arc<dyn Authenticator>,
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Creates a resolver over the given authenticator.
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }

    /// Resolves the caller's logical identity.
    ///
    /// # Errors
    ///
    /// Propagates every authenticator failure except
    /// [`GatewayError::NoCredentials`], which mints a guest identity
    /// instead. A malformed header or invalid token never becomes a guest.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Identity, GatewayError> {
        match self.authenticator.authenticate(headers) {
            Ok(claims) => Ok(Identity::user(claims.sub)),
            Err(GatewayError::NoCredentials) => Ok(Identity::guest()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::{JwtAuthenticator, JwtSigner};
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;

    fn resolver() -> (IdentityResolver, Arc<JwtSigner>) {
        let signer = Arc::new(JwtSigner::new("test-secret", "pulse-gateway", 3600));
        let authenticator = JwtAuthenticator::new(Arc::clone(&signer));
        (IdentityResolver::new(Arc::new(authenticator)), signer)
    }

    #[test]
    fn random_token_uses_letter_alphabet() {
        let token = random_token(64);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn no_credentials_falls_back_to_guest() {
        let (resolver, _) = resolver();
        let Ok(identity) = resolver.resolve(&HeaderMap::new()) else {
            panic!("expected guest fallback");
        };
        assert!(identity.is_guest());
        let suffix = identity.as_str().trim_start_matches("guest-");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn malformed_header_is_an_error_not_a_guest() {
        let (resolver, _) = resolver();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert!(matches!(
            resolver.resolve(&headers),
            Err(GatewayError::UnexpectedAuthHeader)
        ));
    }

    #[test]
    fn invalid_token_is_an_error_not_a_guest() {
        let (resolver, _) = resolver();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(matches!(
            resolver.resolve(&headers),
            Err(GatewayError::InvalidToken)
        ));
    }

    #[test]
    fn valid_token_yields_user_identity() {
        let (resolver, signer) = resolver();
        let Ok(token) = signer.sign(42, "user") else {
            panic!("signing failed");
        };
        let mut headers = HeaderMap::new();
        let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) else {
            panic!("bad header value");
        };
        headers.insert(AUTHORIZATION, value);

        let Ok(identity) = resolver.resolve(&headers) else {
            panic!("resolution failed");
        };
        assert_eq!(identity.as_str(), "user-42");
        assert!(!identity.is_guest());
    }

    #[test]
    fn guest_device_id_reuses_the_identity() {
        let guest = Identity::guest();
        let device = DeviceId::for_identity(&guest);
        assert_eq!(device.as_str(), guest.as_str());
    }

    #[test]
    fn user_device_id_gets_a_random_suffix() {
        let identity = Identity::user(7);
        let a = DeviceId::for_identity(&identity);
        let b = DeviceId::for_identity(&identity);
        assert!(a.as_str().starts_with("user-7-"));
        assert_ne!(a, b);
    }
}
