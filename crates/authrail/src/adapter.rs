//! Facade bundling the middleware and routes around one engine.

use std::sync::Arc;

use axum::Router;
use serde_json::Value;

use crate::config::{ApiRoutesConfig, ConfigError};
use crate::engine::AuthEngine;
use crate::http::ApiRoutes;
use crate::middleware::{GuardLayer, ResyncLayer};

/// Entry point for wiring an [`AuthEngine`] into an axum application.
///
/// # Example
///
/// ```ignore
/// let auth = AuthAdapter::new(engine);
///
/// let app = Router::new()
///     .nest("/auth", auth.api_routes(Some(json!({ "login": { "enabled": true } })))?)
///     .route("/me", get(me).route_layer(auth.is_authenticated()))
///     .layer(auth.resync());
/// ```
#[derive(Clone)]
pub struct AuthAdapter {
    engine: Arc<dyn AuthEngine>,
}

impl AuthAdapter {
    pub fn new(engine: Arc<dyn AuthEngine>) -> Self {
        Self { engine }
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn AuthEngine> {
        &self.engine
    }

    /// Layer restoring the authentication context of every request.
    ///
    /// Install it outermost so routes and guards see the context.
    #[must_use]
    pub fn resync(&self) -> ResyncLayer {
        ResyncLayer::new(self.engine.clone())
    }

    /// Builds the authentication routes from a partial configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the merged configuration is malformed or
    /// fails validation.
    pub fn api_routes<S>(&self, partial: Option<Value>) -> Result<Router<S>, ConfigError>
    where
        S: Clone + Send + Sync + 'static,
    {
        let config = ApiRoutesConfig::from_partial(partial)?;
        Ok(self.api_routes_with(config))
    }

    /// Builds the authentication routes from a complete configuration.
    pub fn api_routes_with<S>(&self, config: ApiRoutesConfig) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        ApiRoutes::new(self.engine.clone(), config).into_router()
    }

    /// Guard letting only authenticated requests through.
    #[must_use]
    pub fn is_authenticated(&self) -> GuardLayer {
        GuardLayer::authenticated()
    }

    /// Guard letting only anonymous requests through.
    #[must_use]
    pub fn is_guest(&self) -> GuardLayer {
        GuardLayer::guest()
    }
}

impl std::fmt::Debug for AuthAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthAdapter").finish_non_exhaustive()
    }
}
