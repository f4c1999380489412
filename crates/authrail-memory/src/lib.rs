//! In-memory authentication engine for authrail.
//!
//! Users and tokens live in `DashMap`s; passwords are checked by whatever
//! [`CredentialComparer`](authrail::CredentialComparer) the engine is built
//! with. Suitable for demos, tests and single-process deployments.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use authrail::{AuthAdapter, PasswordComparer};
//! use authrail_memory::{InMemoryEngine, MemoryEngineConfig};
//!
//! let engine = InMemoryEngine::new(
//!     MemoryEngineConfig::default(),
//!     Arc::new(PasswordComparer::strict()),
//! );
//! let auth = AuthAdapter::new(Arc::new(engine));
//! ```

pub mod config;
pub mod engine;
pub mod token;

pub use config::MemoryEngineConfig;
pub use engine::{ID_FIELD, InMemoryEngine};
pub use token::{TOKEN_PREFIX, generate_token};

/// Type alias for a shareable in-memory engine.
pub type DynMemoryEngine = std::sync::Arc<InMemoryEngine>;

/// Creates an in-memory engine comparing passwords strictly.
pub fn create_engine(config: MemoryEngineConfig) -> DynMemoryEngine {
    std::sync::Arc::new(InMemoryEngine::new(
        config,
        std::sync::Arc::new(authrail::PasswordComparer::strict()),
    ))
}
