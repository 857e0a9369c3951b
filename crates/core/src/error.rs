use crate::types::DbId;

/// Authentication failures. All of them surface as HTTP 401.
///
/// `InvalidOtp` deliberately covers wrong, expired and already-used codes so
/// callers cannot tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,
}

impl AuthError {
    /// Stable machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidOtp => "INVALID_OTP",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Ownership check failed or the target does not exist. Rendered the same
    /// way in both cases.
    #[error("{entity} not found or access denied")]
    AccessDenied { entity: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        CoreError::Auth(AuthError::Unauthorized(msg.into()))
    }
}
