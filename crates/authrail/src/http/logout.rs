//! `DELETE` logout route.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;

use crate::AuthResult;
use crate::middleware::CurrentAuth;

use super::routes::ApiRoutesState;

/// Deletes the tokens held by the request.
///
/// With the all-sessions query flag, every token of the user is synced from
/// the engine first so all of them are deleted. Always answers `null`.
pub async fn logout_handler(
    State(state): State<ApiRoutesState>,
    CurrentAuth(mut auth): CurrentAuth,
    Query(query): Query<HashMap<String, String>>,
) -> AuthResult<Json<Value>> {
    let route = &state.config.logout;

    let all_sessions = is_set(query.get(&route.all_sessions_param));
    if let Some(user) = auth.user().filter(|_| all_sessions) {
        let tokens = state.engine.sync_tokens(user).await?;
        auth.set_tokens(tokens);
    }

    for token in auth.tokens() {
        state.engine.delete_token(token).await?;
    }

    if auth.check() {
        tracing::info!(tokens = auth.tokens().len(), "Logged out");
    }

    Ok(Json(Value::Null))
}

/// `?all`, `?all=1` and `?all=true` are set; `?all=false` and `?all=0` are not.
fn is_set(value: Option<&String>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => v != "false" && v != "0",
    }
}
