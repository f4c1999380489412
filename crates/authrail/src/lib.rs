//! # authrail
//!
//! Axum routes and middleware exposing a pluggable authentication engine.
//!
//! This crate provides:
//! - Configurable login, register, logout and current-user routes
//! - A resync layer restoring the request's identity from a bearer token
//! - Guards restricting routes to authenticated or anonymous requests
//! - Argon2 password hashing and a password comparison strategy
//!
//! User lookup, credential storage and token issuance live behind the
//! [`AuthEngine`] trait; this crate only translates HTTP into engine calls.
//!
//! ## Modules
//!
//! - [`adapter`] - Facade wiring an engine into an application
//! - [`config`] - Route configuration and partial merging
//! - [`engine`] - The engine abstraction and its data types
//! - [`http`] - Axum handlers for the authentication routes
//! - [`middleware`] - Request context, resync layer and guards
//! - [`password`] - Password hashing and comparison

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod middleware;
pub mod password;

pub use adapter::AuthAdapter;
pub use config::{ApiRoutesConfig, ConfigError};
pub use engine::{
    AcceptAll, AccessToken, AuthEngine, CredentialComparer, Fields, Session, UserRecord,
};
pub use error::{AuthError, ErrorCategory};
pub use http::{ApiRoutes, AuthEnvelope, RequestFields};
pub use middleware::{AuthContext, CurrentAuth, GuardLayer, GuardMode, ResyncLayer};
pub use password::{PasswordComparer, hash_password, verify_password};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use authrail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::adapter::AuthAdapter;
    pub use crate::config::{ApiRoutesConfig, ConfigError};
    pub use crate::engine::{
        AccessToken, AuthEngine, CredentialComparer, Fields, Session, UserRecord,
    };
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::middleware::{AuthContext, CurrentAuth, GuardLayer, ResyncLayer};
    pub use crate::password::PasswordComparer;
}
