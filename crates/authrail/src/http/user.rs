//! `GET` current-user route.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::middleware::CurrentAuth;

use super::routes::ApiRoutesState;

/// Returns the authenticated user, or `null` with the configured status.
pub async fn user_handler(
    State(state): State<ApiRoutesState>,
    CurrentAuth(auth): CurrentAuth,
) -> Response {
    match auth.user() {
        Some(user) => (StatusCode::OK, Json(user.clone())).into_response(),
        None => (
            state.config.user.unauthenticated_status_code(),
            Json(Value::Null),
        )
            .into_response(),
    }
}
