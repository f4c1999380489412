//! Route guards gating on the request's authentication state.

use std::task::{Context, Poll};

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tower::{Layer, Service};

use super::context::AuthContext;

/// Which authentication state a guard lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    /// Only authenticated requests continue.
    Authenticated,
    /// Only anonymous requests continue.
    Guest,
}

impl GuardMode {
    /// Returns `true` if a request with this `check()` result may continue.
    #[must_use]
    pub fn allows(self, authenticated: bool) -> bool {
        match self {
            Self::Authenticated => authenticated,
            Self::Guest => !authenticated,
        }
    }
}

/// Tower layer rejecting requests whose authentication state does not match.
///
/// Rejected requests get `401` with a JSON `null` body. Requests that never
/// passed through the resync layer count as anonymous.
#[derive(Debug, Clone, Copy)]
pub struct GuardLayer {
    mode: GuardMode,
}

impl GuardLayer {
    /// Lets only authenticated requests through.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            mode: GuardMode::Authenticated,
        }
    }

    /// Lets only anonymous requests through.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            mode: GuardMode::Guest,
        }
    }

    /// The mode of this guard.
    #[must_use]
    pub fn mode(&self) -> GuardMode {
        self.mode
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardService {
            inner,
            mode: self.mode,
        }
    }
}

/// Service produced by [`GuardLayer`].
#[derive(Debug, Clone)]
pub struct GuardService<S> {
    inner: S,
    mode: GuardMode,
}

impl<S> Service<Request> for GuardService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let authenticated = req
            .extensions()
            .get::<AuthContext>()
            .is_some_and(AuthContext::check);

        if self.mode.allows(authenticated) {
            self.inner.call(req).boxed()
        } else {
            tracing::debug!(mode = ?self.mode, path = %req.uri().path(), "Guard rejected request");
            let response = (StatusCode::UNAUTHORIZED, Json(Value::Null)).into_response();
            async move { Ok(response) }.boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AccessToken, Session};
    use axum::{Router, body::Body, routing::get};
    use serde_json::json;
    use tower::ServiceExt;

    fn context(authenticated: bool) -> Option<AuthContext> {
        authenticated.then(|| {
            AuthContext::from_session(Session {
                user: json!({ "id": "u1" }).as_object().cloned().unwrap(),
                tokens: vec![AccessToken::new("t")],
            })
        })
    }

    async fn status(guard: GuardLayer, context: Option<AuthContext>) -> (StatusCode, String) {
        let app = Router::new().route("/", get(|| async { "ok" })).layer(guard);

        let mut req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        if let Some(context) = context {
            req.extensions_mut().insert(context);
        }

        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_modes_are_complementary() {
        for authenticated in [true, false] {
            assert_ne!(
                GuardMode::Authenticated.allows(authenticated),
                GuardMode::Guest.allows(authenticated)
            );
        }
        assert!(GuardMode::Authenticated.allows(true));
        assert!(GuardMode::Guest.allows(false));
    }

    #[tokio::test]
    async fn test_authenticated_guard() {
        let (code, body) = status(GuardLayer::authenticated(), context(true)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body, "ok");

        let (code, body) = status(GuardLayer::authenticated(), context(false)).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "null");
    }

    #[tokio::test]
    async fn test_guest_guard() {
        let (code, _) = status(GuardLayer::guest(), context(false)).await;
        assert_eq!(code, StatusCode::OK);

        let (code, body) = status(GuardLayer::guest(), context(true)).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "null");
    }

    #[tokio::test]
    async fn test_anonymous_context_counts_as_guest() {
        let (code, _) = status(GuardLayer::authenticated(), Some(AuthContext::new())).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);

        let (code, _) = status(GuardLayer::guest(), Some(AuthContext::new())).await;
        assert_eq!(code, StatusCode::OK);
    }
}
