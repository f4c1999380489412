//! `POST` login route.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};

use crate::AuthResult;
use crate::config::LoginRoute;
use crate::engine::Fields;
use crate::middleware::CurrentAuth;

use super::fields::{RequestFields, pick_fields};
use super::routes::ApiRoutesState;
use super::types::AuthEnvelope;

/// Attempts a login with the credentials found in the body.
///
/// Responds `200` with the issued token, or `401` with an empty envelope.
/// Responses are never cacheable.
pub async fn login_handler(
    State(state): State<ApiRoutesState>,
    CurrentAuth(mut auth): CurrentAuth,
    RequestFields(body): RequestFields,
) -> AuthResult<Response> {
    let (find, compare) = credentials(&state.config.login, &body);

    let session = state.engine.attempt(&find, compare.as_ref()).await?;
    auth.set_session(session);

    let (status, envelope) = if auth.check() {
        tracing::debug!("Login succeeded");
        (StatusCode::OK, AuthEnvelope::from_context(&auth))
    } else {
        tracing::debug!("Login failed");
        (StatusCode::UNAUTHORIZED, AuthEnvelope::failed())
    };

    let mut response = (status, Json(envelope)).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Splits the body into the find set and the optional compare set.
///
/// With the legacy `fields` list, listed names that also appear in
/// `compareBy` are compared and the rest are used for lookup.
#[must_use]
pub fn credentials(route: &LoginRoute, body: &Fields) -> (Fields, Option<Fields>) {
    if let Some(names) = &route.fields {
        let (compare_names, find_names): (Vec<String>, Vec<String>) = names
            .iter()
            .cloned()
            .partition(|name| route.compare_by.contains(name));

        let compare = (!compare_names.is_empty()).then(|| pick_fields(body, &compare_names));
        return (pick_fields(body, &find_names), compare);
    }

    let compare = (!route.compare_by.is_empty()).then(|| pick_fields(body, &route.compare_by));
    (pick_fields(body, &route.find_by), compare)
}
