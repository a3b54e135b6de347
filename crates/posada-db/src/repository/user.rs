//! # User Repository
//!
//! Staff users and authentication.
//!
//! Passwords are stored as SHA-256 hex digests. Authentication compares
//! digests and refuses inactive accounts; a successful login stamps
//! `last_access_at`.

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use posada_core::validation::{validate_password, validate_username};
use posada_core::{User, UserRole};

const USER_COLUMNS: &str =
    "id, username, password_hash, full_name, role, is_active, last_access_at, created_at";

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a new staff user.
    ///
    /// The username and password are validated before hashing; the UNIQUE
    /// index on `username` catches duplicates.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        role: UserRole,
    ) -> DbResult<User> {
        validate_username(username)?;
        validate_password(password)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_lowercase(),
            password_hash: hash_password(password),
            full_name: full_name.trim().to_string(),
            role,
            is_active: true,
            last_access_at: None,
            created_at: Utc::now(),
        };

        debug!(id = %user.id, username = %user.username, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, full_name, role,
                is_active, last_access_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.last_access_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID or fails with NotFound.
    pub async fn require(&self, id: &str) -> DbResult<User> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Gets a user by login name.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Authenticates a user by username and password.
    ///
    /// Returns `None` for unknown usernames, wrong passwords and inactive
    /// accounts alike; callers show one generic failure message.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = self.get_by_username(username).await? else {
            return Ok(None);
        };

        if !user.is_active {
            warn!(username = %user.username, "Login attempt on inactive account");
            return Ok(None);
        }

        if user.password_hash != hash_password(password) {
            return Ok(None);
        }

        sqlx::query("UPDATE users SET last_access_at = ?2 WHERE id = ?1")
            .bind(&user.id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        info!(username = %user.username, "User authenticated");
        Ok(Some(user))
    }

    /// Replaces a user's password.
    pub async fn change_password(&self, id: &str, new_password: &str) -> DbResult<()> {
        validate_password(new_password)?;

        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(id)
            .bind(hash_password(new_password))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Activates or deactivates an account (soft delete).
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Lists all users, active first.
    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY is_active DESC, username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Total number of users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = hash_password("admin123");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_password("admin123"));
        assert_ne!(hash, hash_password("admin124"));
    }
}
