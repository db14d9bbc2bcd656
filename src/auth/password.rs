//! Password hashing behind `password-auth` (argon2id with random salts).

use crate::error::GatewayError;

/// Hashes a plaintext password for storage.
#[must_use]
pub fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}

/// Verifies a plaintext password against a stored hash.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCredentials`] when the password does not
/// match (or the stored hash is malformed — indistinguishable on purpose).
pub fn verify_password(password: &str, hash: &str) -> Result<(), GatewayError> {
    password_auth::verify_password(password, hash).map_err(|_| GatewayError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash).is_ok());
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("hunter2");
        assert!(matches!(
            verify_password("hunter3", &hash),
            Err(GatewayError::InvalidCredentials)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }
}
