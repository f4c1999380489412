//! Request body extraction.
//!
//! Route handlers work on named fields rather than typed bodies: which
//! fields matter is configuration. Bodies may be JSON objects or URL-encoded
//! forms; anything else yields no fields.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;
use url::form_urlencoded;

use crate::AuthResult;
use crate::engine::Fields;
use crate::error::AuthError;

/// Axum extractor collecting the request body as [`Fields`].
pub struct RequestFields(pub Fields);

impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(media_type)
            .unwrap_or_default();

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AuthError::invalid_request(e.body_text()))?;

        parse_fields(&content_type, &body).map(RequestFields)
    }
}

/// Lower-cased media type without parameters.
fn media_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Parses a request body according to its media type.
///
/// # Errors
///
/// Returns `AuthError::InvalidRequest` if a JSON body is malformed.
pub fn parse_fields(media_type: &str, body: &[u8]) -> AuthResult<Fields> {
    if body.is_empty() {
        return Ok(Fields::new());
    }

    if media_type == "application/json" || media_type.ends_with("+json") {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AuthError::invalid_request(format!("Malformed JSON body: {e}")))?;
        return Ok(match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        });
    }

    if media_type == "application/x-www-form-urlencoded" {
        return Ok(parse_form(body));
    }

    Ok(Fields::new())
}

/// Repeated keys collect into an array.
fn parse_form(body: &[u8]) -> Fields {
    let mut fields = Fields::new();

    for (key, value) in form_urlencoded::parse(body) {
        let value = Value::String(value.into_owned());
        match fields.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key.into_owned(), value);
            }
        }
    }

    fields
}

/// Copies the named fields present in `body`.
///
/// Names missing from the body stay absent; validation belongs to the engine.
#[must_use]
pub fn pick_fields(body: &Fields, names: &[String]) -> Fields {
    names
        .iter()
        .filter_map(|name| body.get(name).map(|value| (name.clone(), value.clone())))
        .collect()
}
