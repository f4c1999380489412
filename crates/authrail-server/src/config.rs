use authrail::ApiRoutesConfig;
use authrail_memory::MemoryEngineConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// In-memory engine settings
    #[serde(default)]
    pub engine: EngineSettings,
    /// Partial route configuration, merged over the route defaults.
    /// Filled from the `[routes]` table of the config file by the loader.
    #[serde(default, skip_deserializing)]
    pub routes: Option<Value>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        let mount = &self.server.mount_path;
        if !mount.starts_with('/') || (mount.len() > 1 && mount.ends_with('/')) {
            return Err(format!(
                "server.mount_path must start with '/' and not end with one, got '{mount}'"
            ));
        }

        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }

        if self.engine.unique_fields.iter().any(String::is_empty) {
            return Err("engine.unique_fields cannot contain empty names".into());
        }

        self.route_config()
            .map_err(|e| format!("routes config error: {e}"))?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Route configuration with the `[routes]` partial applied.
    pub fn route_config(&self) -> Result<ApiRoutesConfig, authrail::ConfigError> {
        ApiRoutesConfig::from_partial(self.routes.clone())
    }

    pub fn memory_engine_config(&self) -> MemoryEngineConfig {
        MemoryEngineConfig {
            token_lifetime_secs: self.engine.token_lifetime_secs,
            unique_fields: self.engine.unique_fields.clone(),
            hidden_fields: self.engine.hidden_fields.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prefix the authentication routes are nested under
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_mount_path() -> String {
    "/auth".into()
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mount_path: default_mount_path(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Token validity in seconds; 0 disables expiry
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,
    #[serde(default = "default_unique_fields")]
    pub unique_fields: Vec<String>,
    #[serde(default = "default_hidden_fields")]
    pub hidden_fields: Vec<String>,
    /// Accept logins for accounts without a stored password
    #[serde(default)]
    pub skip_password_when_missing: bool,
}

fn default_token_lifetime() -> u64 {
    MemoryEngineConfig::default().token_lifetime_secs
}
fn default_unique_fields() -> Vec<String> {
    MemoryEngineConfig::default().unique_fields
}
fn default_hidden_fields() -> Vec<String> {
    MemoryEngineConfig::default().hidden_fields
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            token_lifetime_secs: default_token_lifetime(),
            unique_fields: default_unique_fields(),
            hidden_fields: default_hidden_fields(),
            skip_password_when_missing: false,
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use serde_json::Value;
    use std::path::{Path, PathBuf};

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let file = match path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from("authrail.toml"),
        };

        let mut builder = Config::builder();
        if file.exists() {
            builder = builder.add_source(File::from(file.clone()));
        }
        // Environment variable overrides, e.g., AUTHRAIL__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("AUTHRAIL")
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("engine.unique_fields")
                .with_list_parse_key("engine.hidden_fields"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let mut merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;

        if file.exists() {
            merged.routes = read_routes(&file)?;
        }

        merged.validate()?;
        Ok(merged)
    }

    /// Reads the `[routes]` table as-is; its keys are camelCase.
    fn read_routes(path: &Path) -> Result<Option<Value>, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let doc: Value =
            toml::from_str(&text).map_err(|e| format!("config parse error: {e}"))?;
        Ok(doc.get("routes").cloned())
    }
}
