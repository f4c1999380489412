use authrail::CurrentAuth;
use axum::Json;
use serde_json::{Value, json};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Profile of the authenticated user; mounted behind the authenticated guard.
pub async fn me(CurrentAuth(auth): CurrentAuth) -> Json<Value> {
    Json(json!(auth.user()))
}

/// Landing message for anonymous visitors; mounted behind the guest guard.
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome! Register or log in to continue." }))
}
