//! Bearer-token gate and the typed identity it hands to handlers.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use streamshort_core::error::{AuthError, CoreError};
use streamshort_core::types::DbId;

use crate::auth::jwt::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, inserted into request extensions by [`require_auth`].
///
/// Use this as an extractor parameter in any handler mounted behind the gate:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// The user's id (from `claims.sub`).
    pub user_id: DbId,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// The user's role name (`"user"` or `"creator"`).
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            phone: claims.phone,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Gate middleware for protected route groups.
///
/// Rejects with 401 before the handler runs when the header is missing, uses
/// another scheme, or carries a token that fails verification.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let claims = state
        .tokens
        .verify_access_token(token)
        .map_err(|_| AuthError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CoreError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
                .into()
        })
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the route sits behind `require_auth`.
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| CoreError::unauthorized("Authentication required").into())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    fn unauthorized_message(err: AppError) -> String {
        match err {
            AppError::Core(CoreError::Auth(AuthError::Unauthorized(msg))) => msg,
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_rejected() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(unauthorized_message(err), "Missing Authorization header");
    }

    #[test]
    fn other_schemes_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer ", "abc.def.ghi"] {
            let err = bearer_token(&headers(value)).unwrap_err();
            assert_eq!(
                unauthorized_message(err),
                "Invalid Authorization format. Expected: Bearer <token>",
                "value: {value}"
            );
        }
    }
}
