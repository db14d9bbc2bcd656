//! DTOs for signup and login.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user_dto::UserDto;

/// Request body for `POST /api/v1/auth/signup`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Login email; must be unique.
    pub email: String,
    /// Plaintext password (min 8 characters).
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Response body for successful signup or login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthTokenResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user's profile.
    pub user: UserDto,
}
