//! DTOs for profile endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::persistence::UserRecord;

/// Public view of a user row. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDto {
    /// User ID.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Avatar URL, empty when unset.
    pub avatar: String,
    /// Role string.
    pub role: String,
    /// Account status.
    pub status: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserDto {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            full_name: record.full_name,
            avatar: record.avatar,
            role: record.role,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// Request body for `PUT /api/v1/users/me`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub full_name: String,
    /// New avatar URL.
    #[serde(default)]
    pub avatar: String,
}

/// Request body for `PUT /api/v1/users/me/password`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password, verified before the change.
    pub old_password: String,
    /// Replacement password (min 8 characters).
    pub new_password: String,
}

/// Response body for `GET /api/v1/users`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserListResponse {
    /// One page of users.
    pub data: Vec<UserDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
