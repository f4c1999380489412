//! Response bodies shared by the login and register routes.

use serde::Serialize;
use serde_json::Map;
use time::OffsetDateTime;

use crate::engine::{AccessToken, UserRecord};
use crate::middleware::AuthContext;

/// Token type advertised in `access.type`.
pub const BEARER: &str = "Bearer";

/// `{check, user, access}` envelope returned by login and register.
#[derive(Debug, Clone, Serialize)]
pub struct AuthEnvelope {
    pub check: bool,
    pub user: Option<UserRecord>,
    pub access: Option<Access>,
}

/// The `access` member of an [`AuthEnvelope`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Access {
    /// A usable bearer token.
    Bearer(AccessInfo),
    /// No token was issued; serialized as `{}`.
    Empty(Map<String, serde_json::Value>),
}

/// Token details handed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessInfo {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expire_at: Option<OffsetDateTime>,
}

impl From<&AccessToken> for AccessInfo {
    fn from(token: &AccessToken) -> Self {
        Self {
            token: token.token.clone(),
            token_type: BEARER,
            expire_at: token.expire_at,
        }
    }
}

impl AuthEnvelope {
    /// Envelope describing an authenticated context after login.
    #[must_use]
    pub fn from_context(context: &AuthContext) -> Self {
        Self {
            check: context.check(),
            user: context.user().cloned(),
            access: context
                .current_token()
                .map(|token| Access::Bearer(token.into())),
        }
    }

    /// Envelope for a failed login: `{check: false, user: null, access: null}`.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            check: false,
            user: None,
            access: None,
        }
    }

    /// Envelope for a completed registration.
    ///
    /// Reports the context user when the request is authenticated (after
    /// auto-login), otherwise the freshly created record with an empty
    /// `access` object.
    #[must_use]
    pub fn registered(context: &AuthContext, created: UserRecord) -> Self {
        if !context.check() {
            return Self {
                check: false,
                user: Some(created),
                access: Some(Access::Empty(Map::new())),
            };
        }

        Self {
            check: true,
            user: context.user().cloned(),
            access: Some(
                context
                    .current_token()
                    .map(|token| Access::Bearer(token.into()))
                    .unwrap_or_else(|| Access::Empty(Map::new())),
            ),
        }
    }
}
