//! HTTP surface: the configurable authentication routes.
//!
//! | Method | Default path | Handler |
//! |--------|--------------|---------|
//! | POST   | `/login`     | [`login::login_handler`] |
//! | POST   | `/register`  | [`register::register_handler`] |
//! | DELETE | `/logout`    | [`logout::logout_handler`] |
//! | GET    | `/user`      | [`user::user_handler`] |

pub mod fields;
pub mod login;
pub mod logout;
pub mod register;
pub mod routes;
pub mod types;
pub mod user;

pub use fields::{RequestFields, parse_fields, pick_fields};
pub use routes::{ApiRoutes, ApiRoutesState};
pub use types::{Access, AccessInfo, AuthEnvelope};

#[cfg(test)]
pub(crate) mod testing {
    //! In-process engine and request helpers for route tests.

    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, Method, StatusCode, header},
    };
    use serde_json::{Value, json};
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;

    use crate::config::ApiRoutesConfig;
    use crate::engine::{AccessToken, AuthEngine, Fields, Session, UserRecord};
    use crate::error::AuthError;
    use crate::middleware::ResyncLayer;
    use crate::AuthResult;

    /// Engine keeping plaintext users in memory and recording every call.
    ///
    /// A user `<id>` owns the tokens `tok-<id>` and `tok-<id>-device`.
    /// Deleted tokens are recorded but stay valid.
    #[derive(Default)]
    pub struct MockEngine {
        pub users: Mutex<Vec<UserRecord>>,
        pub created: Mutex<Vec<Fields>>,
        pub attempts: Mutex<Vec<(Fields, Option<Fields>)>>,
        pub deleted: Mutex<Vec<String>>,
        pub synced: AtomicUsize,
    }

    impl MockEngine {
        pub fn with_alice() -> Self {
            let engine = Self::default();
            engine.users.lock().unwrap().push(
                json!({ "id": "alice", "email": "alice@example.com", "password": "secret" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            );
            engine
        }

        fn public(user: &UserRecord) -> UserRecord {
            let mut user = user.clone();
            user.remove("password");
            user
        }

        fn token_for(user: &UserRecord) -> AccessToken {
            let id = user["id"].as_str().unwrap_or_default();
            AccessToken::new(format!("tok-{id}"))
                .expiring_at(OffsetDateTime::now_utc() + Duration::hours(1))
        }
    }

    #[async_trait]
    impl AuthEngine for MockEngine {
        async fn resync(&self, token: &str) -> AuthResult<Option<Session>> {
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|user| Self::token_for(user).token == token)
                .map(|user| Session {
                    user: Self::public(user),
                    tokens: vec![AccessToken::new(token)],
                }))
        }

        async fn attempt(
            &self,
            find: &Fields,
            compare: Option<&Fields>,
        ) -> AuthResult<Option<Session>> {
            self.attempts
                .lock()
                .unwrap()
                .push((find.clone(), compare.cloned()));

            if find.is_empty() {
                return Ok(None);
            }

            let users = self.users.lock().unwrap();
            let found = users.iter().find(|user| {
                find.iter().all(|(k, v)| user.get(k) == Some(v))
                    && compare
                        .is_none_or(|compare| compare.iter().all(|(k, v)| user.get(k) == Some(v)))
            });

            Ok(found.map(|user| Session {
                user: Self::public(user),
                tokens: vec![Self::token_for(user)],
            }))
        }

        async fn sync_tokens(&self, user: &UserRecord) -> AuthResult<Vec<AccessToken>> {
            self.synced.fetch_add(1, Ordering::SeqCst);
            let current = Self::token_for(user).token;
            Ok(vec![
                AccessToken::new(current.clone()),
                AccessToken::new(format!("{current}-device")),
            ])
        }

        async fn delete_token(&self, token: &AccessToken) -> AuthResult<()> {
            self.deleted.lock().unwrap().push(token.token.clone());
            Ok(())
        }

        async fn create_user(&self, fields: Fields) -> AuthResult<UserRecord> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|user| user.get("email") == fields.get("email")) {
                return Err(AuthError::conflict("email is already taken"));
            }

            self.created.lock().unwrap().push(fields.clone());

            let mut user = fields;
            user.insert("id".to_string(), json!(format!("user-{}", users.len())));
            users.push(user.clone());
            Ok(Self::public(&user))
        }
    }

    /// Routes from a partial configuration behind the resync layer.
    pub fn app_with(engine: Arc<MockEngine>, partial: Value) -> Router {
        let config = ApiRoutesConfig::from_partial(Some(partial)).unwrap();
        super::ApiRoutes::new(engine.clone(), config)
            .into_router()
            .layer(ResyncLayer::new(engine))
    }

    /// Sends a request and decodes the JSON response; an empty body is `null`.
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        into_parts(app, builder.body(body).unwrap()).await
    }

    /// Sends a URL-encoded form.
    pub async fn send_form(app: &Router, uri: &str, form: &str) -> (StatusCode, HeaderMap, Value) {
        send_raw(app, Method::POST, uri, "application/x-www-form-urlencoded", form).await
    }

    /// Sends a raw body with an explicit content type.
    pub async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, HeaderMap, Value) {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        into_parts(app, request).await
    }

    async fn into_parts(
        app: &Router,
        request: axum::http::Request<Body>,
    ) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, value)
    }
}
