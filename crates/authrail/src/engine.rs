//! Authentication engine contract.
//!
//! The adapter never verifies credentials or stores users itself. Everything
//! that touches persistence or token lifecycle goes through [`AuthEngine`],
//! which is shared by all requests behind an `Arc`.
//!
//! Credential comparison is a strategy the engine receives when it is
//! constructed ([`CredentialComparer`]); there is no way to swap it once the
//! engine is serving requests.
//!
//! # Example Implementation
//!
//! ```ignore
//! use authrail::engine::{AuthEngine, Fields, Session, UserRecord, AccessToken};
//! use authrail::AuthResult;
//!
//! struct LdapEngine { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl AuthEngine for LdapEngine {
//!     async fn resync(&self, token: &str) -> AuthResult<Option<Session>> {
//!         // look the token up, return the owner and the token
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::AuthResult;

/// Named values taken from a request body.
pub type Fields = Map<String, Value>;

/// A user as represented by the engine. Serialized to clients as-is.
pub type UserRecord = Map<String, Value>;

/// An access token issued by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Opaque bearer token value.
    pub token: String,

    /// When the token stops being accepted, if it expires at all.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expire_at: Option<OffsetDateTime>,
}

impl AccessToken {
    /// Creates a token without an expiry.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expire_at: None,
        }
    }

    /// Sets the expiry.
    #[must_use]
    pub fn expiring_at(mut self, expire_at: OffsetDateTime) -> Self {
        self.expire_at = Some(expire_at);
        self
    }

    /// Returns `true` if the token has an expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expire_at
            .is_some_and(|at| at <= OffsetDateTime::now_utc())
    }
}

/// An authenticated user together with the tokens the engine handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The resolved user.
    pub user: UserRecord,
    /// Tokens belonging to this session, most relevant first.
    pub tokens: Vec<AccessToken>,
}

/// Contract required from an authentication engine.
///
/// Implementations must be cheap to share: one instance serves every
/// request for the lifetime of the process.
#[async_trait]
pub trait AuthEngine: Send + Sync {
    /// Re-establishes a session from a previously issued bearer token.
    ///
    /// Returns `None` when the token is unknown or no longer valid. The
    /// returned session carries the presented token.
    async fn resync(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Attempts to authenticate a user.
    ///
    /// `find_by` selects the user; `compare_by`, when given, is handed to
    /// the engine's comparison strategy. On success the engine issues a new
    /// token and returns it as the first entry of `Session::tokens`.
    async fn attempt(
        &self,
        find_by: &Fields,
        compare_by: Option<&Fields>,
    ) -> AuthResult<Option<Session>>;

    /// Returns every live token currently held by `user`.
    async fn sync_tokens(&self, user: &UserRecord) -> AuthResult<Vec<AccessToken>>;

    /// Invalidates a single token.
    async fn delete_token(&self, token: &AccessToken) -> AuthResult<()>;

    /// Persists a new user from registration fields.
    ///
    /// Fields arrive exactly as extracted from the request (with the
    /// password already hashed); validation is the engine's job.
    async fn create_user(&self, fields: Fields) -> AuthResult<UserRecord>;
}

/// Pluggable credential comparison policy.
///
/// Given the values a client supplied and the stored user, decides whether
/// the credentials match. Called once per login attempt; implementations
/// may be CPU heavy, so engines should run them off the async executor.
pub trait CredentialComparer: Send + Sync {
    /// Returns `true` if `supplied` matches `stored`.
    fn compare(&self, supplied: &Fields, stored: &UserRecord) -> bool;
}

/// Comparison strategy that accepts everything.
///
/// Useful for engines whose lookup fields already prove identity, such as
/// magic-link or token-only flows.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl CredentialComparer for AcceptAll {
    fn compare(&self, _supplied: &Fields, _stored: &UserRecord) -> bool {
        true
    }
}
