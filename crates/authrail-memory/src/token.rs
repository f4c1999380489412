//! Opaque bearer token generation.

use rand::Rng;

/// Prefix identifying tokens issued by the in-memory engine.
pub const TOKEN_PREFIX: &str = "tok_";

/// Generates a `tok_` prefixed token carrying 256 bits of randomness.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
}
