//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use streamshort_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            phone: user.phone.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. At least one of `phone` / `email` is set.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
}
