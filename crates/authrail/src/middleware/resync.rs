//! Request decoration layer.
//!
//! Attaches a fresh [`AuthContext`] to every request and, when the request
//! carries `Authorization: Bearer <token>`, resynchronizes it from the
//! engine before the inner service runs.
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/profile", get(profile))
//!     .layer(ResyncLayer::new(engine));
//! ```

use std::{
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::Request,
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::AuthResult;
use crate::engine::AuthEngine;

use super::context::AuthContext;

/// Tower layer installing [`ResyncService`].
#[derive(Clone)]
pub struct ResyncLayer {
    engine: Arc<dyn AuthEngine>,
}

impl ResyncLayer {
    /// Creates a new layer backed by `engine`.
    pub fn new(engine: Arc<dyn AuthEngine>) -> Self {
        Self { engine }
    }
}

impl<S> Layer<S> for ResyncLayer {
    type Service = ResyncService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResyncService {
            inner,
            engine: self.engine.clone(),
        }
    }
}

/// Service attaching an [`AuthContext`] to each request.
#[derive(Clone)]
pub struct ResyncService<S> {
    inner: S,
    engine: Arc<dyn AuthEngine>,
}

impl<S> Service<Request> for ResyncService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // The clone may not be ready; keep the instance that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let engine = self.engine.clone();

        Box::pin(async move {
            let context = match resync_context(engine.as_ref(), req.headers()).await {
                Ok(context) => context,
                Err(e) => return Ok(e.into_response()),
            };

            req.extensions_mut().insert(context);
            inner.call(req).await
        })
    }
}

/// Builds the authentication context for a request.
///
/// Without a well-formed bearer token the engine is not consulted and the
/// context stays anonymous.
pub async fn resync_context(
    engine: &dyn AuthEngine,
    headers: &HeaderMap,
) -> AuthResult<AuthContext> {
    let mut context = AuthContext::new();

    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_bearer)
    else {
        return Ok(context);
    };

    let session = engine.resync(token).await?;
    tracing::debug!(authenticated = session.is_some(), "Bearer token resynchronized");
    context.set_session(session);

    Ok(context)
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; the token is the first word
/// after it and must be non-empty.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
