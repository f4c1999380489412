//! In-memory engine settings.

use serde::{Deserialize, Serialize};
use time::Duration;

/// Settings for [`InMemoryEngine`](crate::InMemoryEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryEngineConfig {
    /// How long issued tokens stay valid, in seconds. Zero disables expiry.
    pub token_lifetime_secs: u64,

    /// User fields that must be unique across all users.
    pub unique_fields: Vec<String>,

    /// User fields never returned from the engine.
    pub hidden_fields: Vec<String>,
}

impl Default for MemoryEngineConfig {
    fn default() -> Self {
        Self {
            token_lifetime_secs: 60 * 60 * 24,
            unique_fields: vec!["email".to_string()],
            hidden_fields: vec!["password".to_string()],
        }
    }
}

impl MemoryEngineConfig {
    /// Token lifetime, or `None` when tokens never expire.
    #[must_use]
    pub fn token_lifetime(&self) -> Option<Duration> {
        match self.token_lifetime_secs {
            0 => None,
            secs => Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))),
        }
    }
}
