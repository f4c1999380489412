//! HTTP middleware for request authentication.
//!
//! - [`ResyncLayer`] attaches an [`AuthContext`] to every request, restoring
//!   it from a bearer token when one is presented
//! - [`GuardLayer`] short-circuits requests in the wrong authentication state
//! - [`CurrentAuth`] hands the context to handlers
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use authrail::middleware::{CurrentAuth, GuardLayer, ResyncLayer};
//!
//! async fn profile(CurrentAuth(auth): CurrentAuth) -> String {
//!     format!("{:?}", auth.user())
//! }
//!
//! let app = Router::new()
//!     .route("/profile", get(profile))
//!     .route_layer(GuardLayer::authenticated())
//!     .layer(ResyncLayer::new(engine));
//! ```

pub mod context;
pub mod error;
pub mod guard;
pub mod resync;

pub use context::{AuthContext, CurrentAuth};
pub use error::error_json;
pub use guard::{GuardLayer, GuardMode, GuardService};
pub use resync::{ResyncLayer, ResyncService, parse_bearer, resync_context};
