//! PostgreSQL implementation of the user repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::UserRecord;
use crate::error::GatewayError;

/// Column list shared by every query returning full user rows.
const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, avatar, role, status, created_at, updated_at";

type UserRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn row_to_record(row: UserRow) -> UserRecord {
    let (id, email, password_hash, full_name, avatar, role, status, created_at, updated_at) = row;
    UserRecord {
        id,
        email,
        password_hash,
        full_name,
        avatar,
        role,
        status,
        created_at,
        updated_at,
    }
}

fn map_db_error(err: sqlx::Error) -> GatewayError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return GatewayError::EmailTaken;
        }
    }
    GatewayError::PersistenceError(err.to_string())
}

/// PostgreSQL-backed user storage using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a repository with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user with the `"user"` role and active status.
    ///
    /// # Errors
    ///
    /// [`GatewayError::EmailTaken`] on a duplicate email, otherwise
    /// [`GatewayError::PersistenceError`] on database failure.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<UserRecord, GatewayError> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, avatar, role, status) \
             VALUES ($1, $2, $3, '', 'user', 'active') RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .bind(password_hash)
            .bind(full_name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row_to_record(row))
    }

    /// Loads a user by ID.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UserNotFound`] when no row matches, otherwise
    /// [`GatewayError::PersistenceError`].
    pub async fn find_by_id(&self, id: i64) -> Result<UserRecord, GatewayError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(GatewayError::UserNotFound)?;
        Ok(row_to_record(row))
    }

    /// Loads a user by email.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UserNotFound`] when no row matches, otherwise
    /// [`GatewayError::PersistenceError`].
    pub async fn find_by_email(&self, email: &str) -> Result<UserRecord, GatewayError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(GatewayError::UserNotFound)?;
        Ok(row_to_record(row))
    }

    /// Updates a user's display name and avatar.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UserNotFound`] when no row matches, otherwise
    /// [`GatewayError::PersistenceError`].
    pub async fn update_profile(
        &self,
        id: i64,
        full_name: &str,
        avatar: &str,
    ) -> Result<UserRecord, GatewayError> {
        let query = format!(
            "UPDATE users SET full_name = $2, avatar = $3, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(full_name)
            .bind(avatar)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(GatewayError::UserNotFound)?;
        Ok(row_to_record(row))
    }

    /// Replaces a user's password hash.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UserNotFound`] when no row matches, otherwise
    /// [`GatewayError::PersistenceError`].
    pub async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<(), GatewayError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(GatewayError::UserNotFound);
        }
        Ok(())
    }

    /// Returns one page of users ordered by ID.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on database failure.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>, GatewayError> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Total number of user rows.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PersistenceError`] on database failure.
    pub async fn count(&self) -> Result<i64, GatewayError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
