//! Repository for the `users` table.
//!
//! All lookups skip soft-deleted rows.

use sqlx::PgPool;
use streamshort_core::roles::ROLE_USER;
use streamshort_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, phone, email, password_hash, role, is_active, \
                        created_at, updated_at, deleted_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (phone, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Insert a plain user for `phone` unless a live one already exists.
    ///
    /// Returns `None` when the phone is taken; the caller then reads the
    /// existing row.
    pub async fn insert_phone_if_absent(
        pool: &PgPool,
        phone: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (phone, role)
             VALUES ($1, $2)
             ON CONFLICT (phone) WHERE deleted_at IS NULL DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(phone)
            .bind(ROLE_USER)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE phone = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (stored lower-cased).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if the role changed.
    pub async fn set_role(pool: &PgPool, id: DbId, role: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET role = $2
             WHERE id = $1 AND role <> $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `is_active = false`. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a user. Returns `true` if the row was updated.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
