//! Database models for the `users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user row from the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Auto-increment user ID (the JWT `sub` claim).
    pub id: i64,
    /// Unique login email.
    pub email: String,
    /// Salted argon2id password hash.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Avatar URL, empty when unset.
    pub avatar: String,
    /// Role string (`"user"` or `"admin"`).
    pub role: String,
    /// Account status (`"active"` or `"inactive"`).
    pub status: String,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
