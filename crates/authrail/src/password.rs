//! Password hashing and the password comparison strategy.
//!
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng
//! - Hashes are stored as PHC strings
//!
//! # Example
//!
//! ```
//! use authrail::password::{hash_password, verify_password};
//!
//! let hash = hash_password("correct horse").unwrap();
//! assert!(verify_password("correct horse", &hash).unwrap());
//! assert!(!verify_password("battery staple", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde_json::Value;

use crate::AuthResult;
use crate::engine::{CredentialComparer, Fields, UserRecord};

/// Default name of the password field in request bodies and user records.
pub const DEFAULT_PASSWORD_FIELD: &str = "password";

/// Hash a password for storage using Argon2id.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't.
/// Returns `Err` only if the hash format is invalid.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Hash a password on the blocking pool.
pub async fn hash_password_blocking(password: String) -> AuthResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    Ok(hash)
}

/// Compares the password field of a login attempt with the stored hash.
#[derive(Debug, Clone)]
pub struct PasswordComparer {
    field: String,
    skip_when_missing: bool,
}

impl PasswordComparer {
    /// Requires a password on both sides; anything missing fails.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            field: DEFAULT_PASSWORD_FIELD.to_string(),
            skip_when_missing: false,
        }
    }

    /// Skips the comparison when either side lacks a password.
    ///
    /// This suits deployments mixing password and passwordless accounts.
    #[must_use]
    pub fn skip_when_missing() -> Self {
        Self {
            field: DEFAULT_PASSWORD_FIELD.to_string(),
            skip_when_missing: true,
        }
    }

    /// Uses a different field name for the password.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Name of the compared field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Default for PasswordComparer {
    fn default() -> Self {
        Self::strict()
    }
}

impl CredentialComparer for PasswordComparer {
    fn compare(&self, supplied: &Fields, stored: &UserRecord) -> bool {
        let supplied = supplied.get(&self.field).and_then(Value::as_str);
        let stored = stored.get(&self.field).and_then(Value::as_str);

        match (supplied, stored) {
            (Some(password), Some(hash)) => match verify_password(password, hash) {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::warn!(error = %e, field = %self.field, "Stored password hash is unreadable");
                    false
                }
            },
            _ => self.skip_when_missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_hash_uses_argon2id() {
        let hash = hash_password("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
    }

    #[test]
    fn test_hash_produces_different_hashes() {
        let hash1 = hash_password("secret").unwrap();
        let hash2 = hash_password("secret").unwrap();

        // Same password, different salts
        assert_ne!(hash1, hash2);
        assert!(verify_password("secret", &hash1).unwrap());
        assert!(verify_password("secret", &hash2).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash_format() {
        assert!(verify_password("secret", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_hash_password_blocking() {
        let hash = hash_password_blocking("secret".to_string()).await.unwrap();
        assert!(verify_password("secret", &hash).unwrap());
    }

    #[test]
    fn test_strict_comparer() {
        let hash = hash_password("secret").unwrap();
        let stored = fields(json!({ "email": "a@b.c", "password": hash }));
        let comparer = PasswordComparer::strict();

        assert!(comparer.compare(&fields(json!({ "password": "secret" })), &stored));
        assert!(!comparer.compare(&fields(json!({ "password": "nope" })), &stored));
        assert!(!comparer.compare(&Fields::new(), &stored));
        assert!(!comparer.compare(
            &fields(json!({ "password": "secret" })),
            &fields(json!({ "email": "a@b.c" }))
        ));
    }

    #[test]
    fn test_skip_when_missing_comparer() {
        let hash = hash_password("secret").unwrap();
        let stored = fields(json!({ "password": hash }));
        let comparer = PasswordComparer::skip_when_missing();

        // Missing on either side skips the check
        assert!(comparer.compare(&Fields::new(), &stored));
        assert!(comparer.compare(
            &fields(json!({ "password": "anything" })),
            &fields(json!({ "email": "a@b.c" }))
        ));

        // Present on both sides still compares
        assert!(comparer.compare(&fields(json!({ "password": "secret" })), &stored));
        assert!(!comparer.compare(&fields(json!({ "password": "nope" })), &stored));
    }

    #[test]
    fn test_unreadable_hash_fails() {
        let stored = fields(json!({ "password": "plaintext" }));
        let comparer = PasswordComparer::skip_when_missing();
        assert!(!comparer.compare(&fields(json!({ "password": "plaintext" })), &stored));
    }

    #[test]
    fn test_custom_field() {
        let hash = hash_password("1234").unwrap();
        let stored = fields(json!({ "pin": hash }));
        let comparer = PasswordComparer::strict().with_field("pin");

        assert_eq!(comparer.field(), "pin");
        assert!(comparer.compare(&fields(json!({ "pin": "1234" })), &stored));
    }
}
