//! Handlers for the `/auth` resource (OTP, refresh, register, login) and the
//! gated identity endpoints (logout, profile).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use streamshort_core::error::{AuthError, CoreError};
use streamshort_core::phone::normalize_phone;
use streamshort_core::roles::ROLE_USER;
use streamshort_core::types::{DbId, Timestamp};
use streamshort_core::validation::normalize_email;
use streamshort_db::models::user::{CreateUser, User, UserResponse};

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::tokens::TokenPair;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::{bearer_token, AuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/otp/send`.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub txn_id: String,
    /// Seconds until the code expires.
    pub expires_in: i64,
    pub message: String,
}

/// Request body for `POST /auth/otp/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub otp: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Returned by `GET /auth/verify` for a live access token.
#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user_id: DbId,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub expires_at: Timestamp,
}

/// Returned by `GET /api/profile`.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: DbId,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Phone OTP
// ---------------------------------------------------------------------------

/// POST /auth/otp/send
pub async fn send_otp(
    State(state): State<AppState>,
    AppJson(input): AppJson<SendOtpRequest>,
) -> AppResult<Json<SendOtpResponse>> {
    let challenge = state.otp.request_otp(&input.phone).await?;
    Ok(Json(SendOtpResponse {
        message: format!("OTP sent to {}", challenge.phone),
        txn_id: challenge.txn_id,
        expires_in: challenge.expires_in,
    }))
}

/// POST /auth/otp/verify
///
/// Consumes the code and returns a fresh token pair. The account is created
/// on first verification.
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(input): AppJson<VerifyOtpRequest>,
) -> AppResult<Json<TokenPair>> {
    let verified = state.otp.verify_otp(&input.phone, &input.otp).await?;
    let pair = state.tokens.issue_token_pair(&verified.user).await?;
    Ok(Json(pair))
}

/// POST /auth/refresh
///
/// Exchange a live refresh token for a new pair. The presented token is
/// revoked.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.tokens.refresh_token_pair(&input.refresh_token).await?;
    Ok(Json(pair))
}

// ---------------------------------------------------------------------------
// Email / password
// ---------------------------------------------------------------------------

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&input.email).map_err(CoreError::Validation)?;
    validate_password_strength(&input.password).map_err(CoreError::Validation)?;
    let phone = match input.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(p) => Some(normalize_phone(p).map_err(CoreError::Validation)?),
        None => None,
    };

    if state.credentials.find_user_by_email(&email).await?.is_some() {
        return Err(CoreError::Conflict("Email is already registered".into()).into());
    }

    let create = CreateUser {
        phone,
        email: Some(email),
        password_hash: Some(hash_password(&input.password)?),
        role: ROLE_USER.to_string(),
    };
    let user = state.credentials.create_user(&create).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let response = auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
///
/// Unknown email and wrong password fail the same way.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim().to_lowercase();
    let Some(user) = state.credentials.find_user_by_email(&email).await? else {
        verify_password(&input.password, None)?;
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(&input.password, user.password_hash.as_deref())? {
        tracing::info!(user_id = %user.id, "Login failed");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    Ok(Json(auth_response(&state, &user).await?))
}

/// GET /auth/verify
///
/// Introspect the bearer token. Any failure is a 401 with the gate's codes.
pub async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<VerifyTokenResponse>> {
    let token = bearer_token(&headers)?;
    let claims = state.tokens.verify_access_token(token)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;

    Ok(Json(VerifyTokenResponse {
        valid: true,
        user_id: claims.sub,
        phone: claims.phone,
        email: claims.email,
        role: claims.role,
        expires_at,
    }))
}

// ---------------------------------------------------------------------------
// Gated
// ---------------------------------------------------------------------------

/// POST /api/auth/logout
///
/// Revoke all refresh tokens of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    state.tokens.revoke(auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/profile
pub async fn profile(auth_user: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: auth_user.user_id,
        phone: auth_user.phone,
        email: auth_user.email,
        role: auth_user.role,
        message: "Protected endpoint accessed successfully",
    })
}

async fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let tokens = state.tokens.issue_token_pair(user).await?;
    Ok(AuthResponse {
        user: UserResponse::from(user),
        tokens,
    })
}
