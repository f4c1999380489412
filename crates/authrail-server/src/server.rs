use std::{net::SocketAddr, sync::Arc};

use anyhow::bail;
use authrail::{AuthAdapter, AuthEngine, PasswordComparer};
use authrail_memory::InMemoryEngine;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, handlers};

/// Paths served next to the authentication routes.
const APP_PATHS: [&str; 3] = ["/healthz", "/me", "/welcome"];

pub struct AuthrailServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the application around a fresh in-memory engine.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let comparer = if cfg.engine.skip_password_when_missing {
        PasswordComparer::skip_when_missing()
    } else {
        PasswordComparer::strict()
    };
    let engine = InMemoryEngine::new(cfg.memory_engine_config(), Arc::new(comparer));
    build_app_with(cfg, Arc::new(engine))
}

/// Builds the application around `engine`.
pub fn build_app_with(cfg: &AppConfig, engine: Arc<dyn AuthEngine>) -> anyhow::Result<Router> {
    let auth = AuthAdapter::new(engine);
    let routes = cfg.route_config()?;
    let mount_path = cfg.server.mount_path.as_str();

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/me",
            get(handlers::me).route_layer(auth.is_authenticated()),
        )
        .route(
            "/welcome",
            get(handlers::welcome).route_layer(auth.is_guest()),
        );

    let app = if mount_path == "/" {
        let enabled = [
            (routes.login.enabled, &routes.login.path),
            (routes.register.enabled, &routes.register.path),
            (routes.logout.enabled, &routes.logout.path),
            (routes.user.enabled, &routes.user.path),
        ];
        for (_, path) in enabled.iter().filter(|(on, _)| *on) {
            if APP_PATHS.contains(&path.as_str()) {
                bail!("route path '{path}' collides with a built-in path; set server.mount_path");
            }
        }
        app.merge(auth.api_routes_with(routes))
    } else {
        app.nest(mount_path, auth.api_routes_with(routes))
    };

    // Middleware stack (order: resync -> trace -> body limit)
    Ok(app
        .layer(auth.resync())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        )))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<AuthrailServer> {
        let app = build_app(&self.config)?;
        Ok(AuthrailServer {
            addr: self.addr,
            app,
        })
    }
}

impl AuthrailServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_app_with_defaults() {
        assert!(build_app(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_root_mount_collision_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.mount_path = "/".to_string();
        cfg.routes = Some(json!({ "user": { "path": "/me" } }));

        let err = build_app(&cfg).unwrap_err();
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn test_capture_route_path_is_an_error() {
        let cfg = AppConfig {
            routes: Some(json!({ "user": { "path": "/:id" } })),
            ..Default::default()
        };
        assert!(build_app(&cfg).is_err());
    }

    #[test]
    fn test_root_mount_without_collision() {
        let mut cfg = AppConfig::default();
        cfg.server.mount_path = "/".to_string();
        assert!(build_app(&cfg).is_ok());
    }
}
