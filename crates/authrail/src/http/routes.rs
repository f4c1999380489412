//! Route controller: registers the enabled authentication routes.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::config::ApiRoutesConfig;
use crate::engine::AuthEngine;

use super::{
    login::login_handler, logout::logout_handler, register::register_handler, user::user_handler,
};

/// State shared by the authentication route handlers.
#[derive(Clone)]
pub struct ApiRoutesState {
    /// Engine serving every request.
    pub engine: Arc<dyn AuthEngine>,

    /// Merged route configuration.
    pub config: Arc<ApiRoutesConfig>,
}

/// Builds the authentication sub-router.
///
/// # Example
///
/// ```ignore
/// let routes = ApiRoutes::new(engine.clone(), ApiRoutesConfig::default());
/// let app = Router::new()
///     .nest("/auth", routes.into_router())
///     .layer(ResyncLayer::new(engine));
/// ```
pub struct ApiRoutes {
    state: ApiRoutesState,
}

impl ApiRoutes {
    /// Creates a controller for `engine` with an already merged configuration.
    pub fn new(engine: Arc<dyn AuthEngine>, config: ApiRoutesConfig) -> Self {
        Self {
            state: ApiRoutesState {
                engine,
                config: Arc::new(config),
            },
        }
    }

    /// The configuration routes are registered from.
    #[must_use]
    pub fn config(&self) -> &ApiRoutesConfig {
        &self.state.config
    }

    /// Registers every enabled route and returns the router.
    ///
    /// A section whose `enabled` flag is false contributes no route at all.
    pub fn into_router<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let config = self.state.config.clone();
        let mut router = Router::new();

        if config.login.enabled {
            router = router.route(&config.login.path, post(login_handler));
        }

        if config.register.enabled {
            router = router.route(&config.register.path, post(register_handler));
        }

        if config.logout.enabled {
            router = router.route(&config.logout.path, delete(logout_handler));
        }

        if config.user.enabled {
            router = router.route(&config.user.path, get(user_handler));
        }

        tracing::debug!(
            login = config.login.enabled,
            register = config.register.enabled,
            logout = config.logout.enabled,
            user = config.user.enabled,
            "Authentication routes registered"
        );

        router.with_state(self.state)
    }
}
