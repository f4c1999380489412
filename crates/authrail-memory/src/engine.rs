//! [`AuthEngine`] backed by concurrent in-process maps.

use std::sync::Arc;

use async_trait::async_trait;
use authrail::{
    AccessToken, AuthEngine, AuthError, AuthResult, CredentialComparer, Fields, Session,
    UserRecord,
};
use dashmap::DashMap;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::config::MemoryEngineConfig;
use crate::token::generate_token;

/// Key every user record is stored under.
pub const ID_FIELD: &str = "id";

/// A token together with the user it was issued to.
#[derive(Debug, Clone)]
struct IssuedToken {
    user_id: String,
    token: AccessToken,
}

/// Reference engine keeping users and tokens in memory.
///
/// Users are keyed by `id` (a UUID unless the caller supplies one) and tokens
/// by their value. Nothing is persisted; dropping the engine drops every
/// account.
pub struct InMemoryEngine {
    config: MemoryEngineConfig,
    comparer: Arc<dyn CredentialComparer>,
    users: DashMap<String, UserRecord>,
    tokens: DashMap<String, IssuedToken>,
    /// Serializes user creation so uniqueness checks cannot interleave.
    create_lock: Mutex<()>,
}

impl InMemoryEngine {
    /// Creates an empty engine using `comparer` for every login attempt.
    pub fn new(config: MemoryEngineConfig, comparer: Arc<dyn CredentialComparer>) -> Self {
        Self {
            config,
            comparer,
            users: DashMap::new(),
            tokens: DashMap::new(),
            create_lock: Mutex::new(()),
        }
    }

    /// The engine settings.
    #[must_use]
    pub fn config(&self) -> &MemoryEngineConfig {
        &self.config
    }

    /// Number of registered users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of stored tokens, including expired ones not yet evicted.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Evicts every expired token and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, issued| !issued.token.is_expired());
        let purged = before.saturating_sub(self.tokens.len());
        if purged > 0 {
            tracing::debug!(purged, "Expired tokens evicted");
        }
        purged
    }

    /// Copy of `user` without the hidden fields.
    fn public(&self, user: &UserRecord) -> UserRecord {
        let mut user = user.clone();
        for field in &self.config.hidden_fields {
            user.remove(field);
        }
        user
    }

    fn find_user(&self, find: &Fields) -> Option<UserRecord> {
        self.users
            .iter()
            .find(|entry| {
                find.iter()
                    .all(|(key, value)| entry.value().get(key) == Some(value))
            })
            .map(|entry| entry.value().clone())
    }

    fn issue_token(&self, user_id: &str) -> AccessToken {
        let mut token = AccessToken::new(generate_token());
        if let Some(lifetime) = self.config.token_lifetime() {
            token = token.expiring_at(OffsetDateTime::now_utc() + lifetime);
        }

        self.tokens.insert(
            token.token.clone(),
            IssuedToken {
                user_id: user_id.to_string(),
                token: token.clone(),
            },
        );
        token
    }

    fn taken_field(&self, fields: &Fields) -> Option<&str> {
        self.config.unique_fields.iter().find_map(|name| {
            let value = fields.get(name).filter(|v| !v.is_null())?;
            self.users
                .iter()
                .any(|entry| entry.value().get(name) == Some(value))
                .then_some(name.as_str())
        })
    }
}

/// String form of an id value.
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl AuthEngine for InMemoryEngine {
    async fn resync(&self, token: &str) -> AuthResult<Option<Session>> {
        let Some(issued) = self.tokens.get(token).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        if issued.token.is_expired() {
            self.tokens.remove(token);
            tracing::debug!("Expired token evicted on resync");
            return Ok(None);
        }

        let Some(user) = self.users.get(&issued.user_id).map(|u| self.public(u.value())) else {
            self.tokens.remove(token);
            return Ok(None);
        };

        Ok(Some(Session {
            user,
            tokens: vec![issued.token],
        }))
    }

    async fn attempt(&self, find: &Fields, compare: Option<&Fields>) -> AuthResult<Option<Session>> {
        if find.is_empty() {
            return Ok(None);
        }

        let Some(stored) = self.find_user(find) else {
            tracing::debug!("No user matches the lookup fields");
            return Ok(None);
        };

        if let Some(supplied) = compare {
            let comparer = self.comparer.clone();
            let supplied = supplied.clone();
            let record = stored.clone();
            let matched =
                tokio::task::spawn_blocking(move || comparer.compare(&supplied, &record)).await?;
            if !matched {
                tracing::debug!("Credential comparison failed");
                return Ok(None);
            }
        }

        let user_id = stored
            .get(ID_FIELD)
            .map(id_string)
            .ok_or_else(|| AuthError::internal("stored user has no id"))?;
        let token = self.issue_token(&user_id);
        tracing::debug!(user_id = %user_id, "Token issued");

        Ok(Some(Session {
            user: self.public(&stored),
            tokens: vec![token],
        }))
    }

    async fn sync_tokens(&self, user: &UserRecord) -> AuthResult<Vec<AccessToken>> {
        let Some(user_id) = user.get(ID_FIELD).map(id_string) else {
            return Ok(Vec::new());
        };

        self.purge_expired();
        Ok(self
            .tokens
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().token.clone())
            .collect())
    }

    async fn delete_token(&self, token: &AccessToken) -> AuthResult<()> {
        self.tokens.remove(&token.token);
        Ok(())
    }

    async fn create_user(&self, mut fields: Fields) -> AuthResult<UserRecord> {
        let _guard = self.create_lock.lock().await;

        if let Some(name) = self.taken_field(&fields) {
            return Err(AuthError::conflict(format!("{name} is already taken")));
        }

        let id = match fields.get(ID_FIELD).filter(|v| !v.is_null()) {
            Some(id) => id_string(id),
            None => uuid::Uuid::new_v4().to_string(),
        };
        if self.users.contains_key(&id) {
            return Err(AuthError::conflict(format!("user {id} already exists")));
        }

        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        let user = self.public(&fields);
        self.users.insert(id.clone(), fields);
        tracing::info!(user_id = %id, "User created");

        Ok(user)
    }
}
