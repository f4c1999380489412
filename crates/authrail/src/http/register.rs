//! `POST` registration route.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::AuthResult;
use crate::engine::Fields;
use crate::middleware::CurrentAuth;
use crate::password::hash_password_blocking;

use super::fields::{RequestFields, pick_fields};
use super::routes::ApiRoutesState;
use super::types::AuthEnvelope;

/// Creates a user from the configured body fields.
///
/// Already authenticated requests get an empty `403` unless `allowOnLogged`
/// is set. With `autoLogin` the new user is logged in right away.
pub async fn register_handler(
    State(state): State<ApiRoutesState>,
    CurrentAuth(mut auth): CurrentAuth,
    RequestFields(body): RequestFields,
) -> AuthResult<Response> {
    let route = &state.config.register;

    if auth.check() && !route.allow_on_logged {
        tracing::debug!("Registration refused for an authenticated request");
        return Ok(StatusCode::FORBIDDEN.into_response());
    }

    let mut fields = pick_fields(&body, &route.fields);
    hash_field(&mut fields, &route.password_field).await?;

    let created = state.engine.create_user(fields).await?;
    tracing::debug!("User registered");

    if route.auto_login {
        let mut find = Fields::new();
        if let Some(key) = created.get(&route.login_by) {
            find.insert(route.login_by.clone(), key.clone());
        }

        let session = state.engine.attempt(&find, None).await?;
        if session.is_none() {
            tracing::warn!(login_by = %route.login_by, "Auto-login after registration failed");
        }
        auth.set_session(session);
    }

    Ok((
        StatusCode::CREATED,
        Json(AuthEnvelope::registered(&auth, created)),
    )
        .into_response())
}

/// Replaces a string password with its Argon2 hash. Other values are left alone.
async fn hash_field(fields: &mut Fields, name: &str) -> AuthResult<()> {
    if let Some(Value::String(password)) = fields.get_mut(name) {
        let hash = hash_password_blocking(std::mem::take(password)).await?;
        *password = hash;
    }
    Ok(())
}
