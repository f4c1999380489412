//! Error response handling.
//!
//! Implements `IntoResponse` for `AuthError` so handlers can return
//! `Result<_, AuthError>` and engine failures surface as JSON errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "Request failed");
        }

        let body = error_json(self.error_code(), &self.to_string());
        (status, Json(body)).into_response()
    }
}

/// HTTP status for an `AuthError`.
fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::Conflict { .. } => StatusCode::CONFLICT,
        AuthError::Engine { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Hashing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Creates the JSON error body used by every error response.
#[must_use]
pub fn error_json(code: &str, message: &str) -> serde_json::Value {
    json!({
        "error": code,
        "message": message,
    })
}
