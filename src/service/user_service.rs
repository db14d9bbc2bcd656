//! User service: signup, login, and profile orchestration.

use std::sync::Arc;

use crate::auth::JwtSigner;
use crate::auth::password::{hash_password, verify_password};
use crate::error::GatewayError;
use crate::persistence::{UserRecord, UserRepository};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Orchestration layer for account and profile operations.
///
/// Stateless coordinator: owns the [`UserRepository`] for storage and a
/// shared [`JwtSigner`] for token issuance.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
    signer: Arc<JwtSigner>,
}

/// Result of a successful signup or login.
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// The stored user row.
    pub user: UserRecord,
    /// Freshly issued bearer token.
    pub token: String,
}

fn validate_signup(email: &str, password: &str) -> Result<(), GatewayError> {
    if !email.contains('@') || email.len() < 3 {
        return Err(GatewayError::InvalidRequest("invalid email".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(GatewayError::InvalidRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(repo: UserRepository, signer: Arc<JwtSigner>) -> Self {
        Self { repo, signer }
    }

    /// Registers a new account and issues its first token.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidRequest`] on validation failure,
    /// [`GatewayError::EmailTaken`] on a duplicate email, or a
    /// persistence error.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthenticatedUser, GatewayError> {
        validate_signup(email, password)?;
        let hash = hash_password(password);
        let user = self.repo.create(email, &hash, full_name).await?;
        let token = self.signer.sign(user.id, &user.role)?;
        tracing::info!(user_id = user.id, "user signed up");
        Ok(AuthenticatedUser { user, token })
    }

    /// Verifies credentials and issues a token.
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidCredentials`] on a failed login, or a
    /// persistence error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, GatewayError> {
        let user = match self.repo.find_by_email(email).await {
            Ok(user) => user,
            Err(GatewayError::UserNotFound) => return Err(GatewayError::InvalidCredentials),
            Err(err) => return Err(err),
        };
        verify_password(password, &user.password_hash)?;
        let token = self.signer.sign(user.id, &user.role)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(AuthenticatedUser { user, token })
    }

    /// Loads the caller's own profile.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UserNotFound`] or a persistence error.
    pub async fn me(&self, user_id: i64) -> Result<UserRecord, GatewayError> {
        self.repo.find_by_id(user_id).await
    }

    /// Updates the caller's display name and avatar.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UserNotFound`] or a persistence error.
    pub async fn update_profile(
        &self,
        user_id: i64,
        full_name: &str,
        avatar: &str,
    ) -> Result<UserRecord, GatewayError> {
        self.repo.update_profile(user_id, full_name, avatar).await
    }

    /// Replaces the caller's password after verifying the old one.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidCredentials`] when the old password is
    /// wrong, [`GatewayError::InvalidRequest`] when the new one is too
    /// short, or a persistence error.
    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(GatewayError::InvalidRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let user = self.repo.find_by_id(user_id).await?;
        verify_password(old_password, &user.password_hash)?;
        let hash = hash_password(new_password);
        self.repo.update_password(user_id, &hash).await
    }

    /// Returns one page of users and the total row count.
    ///
    /// # Errors
    ///
    /// A persistence error.
    pub async fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserRecord>, i64), GatewayError> {
        let users = self.repo.list(limit, offset).await?;
        let total = self.repo.count().await?;
        Ok((users, total))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn signup_validation_rejects_bad_email() {
        assert!(matches!(
            validate_signup("not-an-email", "longenough"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn signup_validation_rejects_short_password() {
        assert!(matches!(
            validate_signup("a@b.com", "short"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn signup_validation_accepts_reasonable_input() {
        assert!(validate_signup("a@b.com", "longenough").is_ok());
    }
}
