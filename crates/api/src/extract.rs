//! Request extractors whose rejections use the application error format.
//!
//! Axum's own `Json`, `Path` and `Query` reject with plain-text bodies and
//! statuses such as 415 or 422. These wrappers turn every rejection into
//! [`CoreError::Validation`], so malformed input is always a 400 with the
//! usual `{"error", "code"}` body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use streamshort_core::error::CoreError;

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Typed query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        AppError::Core(CoreError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Core(CoreError::Validation(format!(
            "Invalid path parameter: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Core(CoreError::Validation(format!(
            "Invalid query string: {}",
            rejection.body_text()
        )))
    }
}
