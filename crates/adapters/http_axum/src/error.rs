//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use minishop_domain::error::{AuthError, MiniShopError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Status code and client-facing message for an error.
///
/// Storage failures are logged here and hidden behind a generic message.
pub(crate) fn classify(err: &MiniShopError) -> (StatusCode, String) {
    match err {
        MiniShopError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        MiniShopError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
        MiniShopError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
        MiniShopError::Auth(AuthError::InvalidCode) => {
            (StatusCode::BAD_REQUEST, AuthError::InvalidCode.to_string())
        }
        MiniShopError::Auth(AuthError::PasswordHash) => {
            tracing::error!("password hashing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
        MiniShopError::Auth(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
        MiniShopError::Storage(err) => {
            tracing::error!(error = %err, "storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

/// Maps [`MiniShopError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(MiniShopError);

impl From<MiniShopError> for ApiError {
    fn from(err: MiniShopError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(MiniShopError::Storage(Box::new(err)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self.0);
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
