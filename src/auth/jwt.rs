//! HS256 JWT signing and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Claims carried by every issued token.
///
/// `sub` is the numeric user ID; the realtime identity resolver derives
/// `user-<sub>` logical identities from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user ID.
    pub sub: i64,
    /// User role (`"user"` or `"admin"`).
    pub role: String,
    /// Token issuer.
    pub iss: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Signs and verifies gateway tokens with a shared HMAC secret.
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_secs: u64,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtSigner {
    /// Creates a signer from the shared secret.
    #[must_use]
    pub fn new(secret: &str, issuer: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            ttl_secs,
        }
    }

    /// Issues a token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if encoding fails (malformed key).
    pub fn sign(&self, user_id: i64, role: &str) -> Result<String, GatewayError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| GatewayError::Internal(format!("jwt encoding: {e}")))
    }

    /// Verifies a token's signature, expiry, and issuer, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidToken`] for any validation failure,
    /// including a missing or non-numeric `sub` claim.
    pub fn verify(&self, token: &str) -> Result<Claims, GatewayError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| GatewayError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn signer() -> JwtSigner {
        JwtSigner::new("test-secret", "pulse-gateway", 3600)
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let signer = signer();
        let Ok(token) = signer.sign(42, "user") else {
            panic!("signing failed");
        };
        let Ok(claims) = signer.verify(&token) else {
            panic!("verification failed");
        };
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "user");
        assert_eq!(claims.iss, "pulse-gateway");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let Ok(token) = signer().sign(1, "user") else {
            panic!("signing failed");
        };
        let other = JwtSigner::new("another-secret", "pulse-gateway", 3600);
        assert!(matches!(
            other.verify(&token),
            Err(GatewayError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let issuer_a = JwtSigner::new("test-secret", "a", 3600);
        let issuer_b = JwtSigner::new("test-secret", "b", 3600);
        let Ok(token) = issuer_a.sign(1, "user") else {
            panic!("signing failed");
        };
        assert!(issuer_b.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            signer().verify("not.a.jwt"),
            Err(GatewayError::InvalidToken)
        ));
    }
}
