//! Per-request authentication context.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::engine::{AccessToken, Session, UserRecord};

/// Authentication state of a single request.
///
/// A fresh context is attached to every request by the resync layer and
/// dropped with the request; it is never shared between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthContext {
    user: Option<UserRecord>,
    tokens: Vec<AccessToken>,
}

impl AuthContext {
    /// Creates an anonymous context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from an engine session.
    #[must_use]
    pub fn from_session(session: Session) -> Self {
        Self {
            user: Some(session.user),
            tokens: session.tokens,
        }
    }

    /// Returns `true` if a user is authenticated.
    #[must_use]
    pub fn check(&self) -> bool {
        self.user.is_some()
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    /// Tokens held by this context.
    #[must_use]
    pub fn tokens(&self) -> &[AccessToken] {
        &self.tokens
    }

    /// The token most recently issued or presented.
    #[must_use]
    pub fn current_token(&self) -> Option<&AccessToken> {
        self.tokens.first()
    }

    /// Replaces the authentication state with `session`, or clears it.
    pub fn set_session(&mut self, session: Option<Session>) {
        *self = session.map(Self::from_session).unwrap_or_default();
    }

    /// Replaces the held tokens.
    pub fn set_tokens(&mut self, tokens: Vec<AccessToken>) {
        self.tokens = tokens;
    }
}

/// Axum extractor yielding the request's [`AuthContext`].
///
/// Never rejects: a request that did not pass through the resync layer
/// yields an anonymous context.
///
/// # Example
///
/// ```ignore
/// async fn handler(CurrentAuth(auth): CurrentAuth) -> impl IntoResponse {
///     if auth.check() {
///         // ...
///     }
/// }
/// ```
pub struct CurrentAuth(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default();
        Ok(CurrentAuth(context))
    }
}
