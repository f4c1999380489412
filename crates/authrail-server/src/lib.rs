pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::{AppConfig, EngineSettings, LoggingConfig, ServerConfig};
pub use observability::{apply_logging, init_tracing};
pub use server::{AuthrailServer, ServerBuilder, build_app, build_app_with};
