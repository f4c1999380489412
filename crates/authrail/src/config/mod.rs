//! Route configuration for the authentication API.
//!
//! Callers supply a partial configuration (JSON or TOML) which is deep
//! merged over [`ApiRoutesConfig::default`]. Keys are camelCase, matching
//! the JSON bodies the routes speak.
//!
//! # Example (TOML)
//!
//! ```toml
//! [login]
//! enabled = true
//! findBy = ["username"]
//!
//! [user]
//! unauthenticatedStatus = 403
//! ```

pub mod merge;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use merge::{deep_merge, merge_partial};

/// Fully populated route configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiRoutesConfig {
    /// `POST` login route.
    pub login: LoginRoute,

    /// `POST` registration route.
    pub register: RegisterRoute,

    /// `DELETE` logout route.
    pub logout: LogoutRoute,

    /// `GET` current-user route.
    pub user: UserRoute,
}

/// Login route settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRoute {
    pub enabled: bool,
    pub path: String,

    /// Body fields used to look the user up.
    pub find_by: Vec<String>,

    /// Body fields handed to the engine's comparison strategy.
    /// Empty means the attempt carries no compare set.
    pub compare_by: Vec<String>,

    /// Legacy single field list. When set it replaces `find_by`; listed
    /// names that also appear in `compare_by` are compared, the rest are
    /// used for lookup.
    pub fields: Option<Vec<String>>,
}

impl Default for LoginRoute {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "/login".to_string(),
            find_by: vec!["email".to_string()],
            compare_by: vec!["password".to_string()],
            fields: None,
        }
    }
}

/// Registration route settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRoute {
    pub enabled: bool,
    pub path: String,

    /// Body fields passed to the engine's `create_user`.
    pub fields: Vec<String>,

    /// Field hashed before the user is created.
    pub password_field: String,

    /// Allow registering while the request is already authenticated.
    pub allow_on_logged: bool,

    /// Log the new user in right after creation.
    pub auto_login: bool,

    /// User record key used to find the new user for auto-login.
    pub login_by: String,
}

impl Default for RegisterRoute {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "/register".to_string(),
            fields: vec!["email".to_string(), "password".to_string()],
            password_field: "password".to_string(),
            allow_on_logged: false,
            auto_login: true,
            login_by: "id".to_string(),
        }
    }
}

/// Logout route settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoutRoute {
    pub enabled: bool,
    pub path: String,

    /// Query parameter that requests logging out every session of the user.
    pub all_sessions_param: String,
}

impl Default for LogoutRoute {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/logout".to_string(),
            all_sessions_param: "all".to_string(),
        }
    }
}

/// Current-user route settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRoute {
    pub enabled: bool,
    pub path: String,

    /// Status returned to anonymous requests (401 or 403).
    pub unauthenticated_status: u16,
}

impl Default for UserRoute {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/user".to_string(),
            unauthenticated_status: 401,
        }
    }
}

impl UserRoute {
    /// Status code for anonymous requests.
    #[must_use]
    pub fn unauthenticated_status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.unauthenticated_status).unwrap_or(StatusCode::UNAUTHORIZED)
    }
}

/// Route configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The merged configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(String),

    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl ApiRoutesConfig {
    /// Merges a partial JSON configuration over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the merged document does not describe
    /// every section, and `ConfigError::InvalidValue` if validation fails.
    pub fn from_partial(partial: Option<Value>) -> Result<Self, ConfigError> {
        let defaults = serde_json::to_value(Self::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        let merged = merge_partial(defaults, partial);

        let config: Self =
            serde_json::from_value(merged).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Merges a partial TOML configuration over the defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let partial: Value = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_partial(Some(partial))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A route path does not start with `/`, or contains `:`, `*`, `{` or `}`
    /// - The enabled login route has nothing to look users up by
    /// - Login and register are both enabled on the same path
    /// - The unauthenticated user status is not 401 or 403
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, path) in [
            ("login", &self.login.path),
            ("register", &self.register.path),
            ("logout", &self.logout.path),
            ("user", &self.user.path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "{name}.path must start with '/', got '{path}'"
                )));
            }
            // captures would be swallowed by the router or make it panic
            if path.contains([':', '*', '{', '}']) {
                return Err(ConfigError::InvalidValue(format!(
                    "{name}.path cannot contain ':', '*', '{{' or '}}', got '{path}'"
                )));
            }
        }

        if self.login.enabled {
            let has_lookup = match &self.login.fields {
                Some(fields) => !fields.is_empty(),
                None => !self.login.find_by.is_empty(),
            };
            if !has_lookup {
                return Err(ConfigError::InvalidValue(
                    "login requires a non-empty findBy (or legacy fields) list".to_string(),
                ));
            }
        }

        if self.login.enabled && self.register.enabled && self.login.path == self.register.path {
            return Err(ConfigError::InvalidValue(format!(
                "login and register cannot share the POST path '{}'",
                self.login.path
            )));
        }

        if self.register.enabled && self.register.auto_login && self.register.login_by.is_empty()
        {
            return Err(ConfigError::InvalidValue(
                "register.loginBy cannot be empty when autoLogin is enabled".to_string(),
            ));
        }

        match self.user.unauthenticated_status {
            401 | 403 => {}
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "user.unauthenticatedStatus must be 401 or 403, got {other}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_partial_yields_defaults() {
        assert_eq!(
            ApiRoutesConfig::from_partial(None).unwrap(),
            ApiRoutesConfig::default()
        );
        assert_eq!(
            ApiRoutesConfig::from_partial(Some(json!({}))).unwrap(),
            ApiRoutesConfig::default()
        );
    }

    #[test]
    fn test_defaults() {
        let config = ApiRoutesConfig::default();
        assert!(!config.login.enabled);
        assert_eq!(config.login.path, "/login");
        assert!(!config.register.enabled);
        assert!(config.logout.enabled);
        assert_eq!(config.logout.path, "/logout");
        assert!(config.user.enabled);
        assert_eq!(config.user.path, "/user");
        assert_eq!(
            config.user.unauthenticated_status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_partial_overrides_only_present_leaves() {
        let config = ApiRoutesConfig::from_partial(Some(json!({
            "login": { "enabled": true, "findBy": ["username"] },
            "user": { "path": "/me" }
        })))
        .unwrap();

        assert!(config.login.enabled);
        assert_eq!(config.login.find_by, vec!["username"]);
        // untouched leaves keep their defaults
        assert_eq!(config.login.path, "/login");
        assert_eq!(config.login.compare_by, vec!["password"]);
        assert_eq!(config.user.path, "/me");
        assert!(config.user.enabled);
        assert_eq!(config.register, RegisterRoute::default());
        assert_eq!(config.logout, LogoutRoute::default());
    }

    #[test]
    fn test_legacy_fields() {
        let config = ApiRoutesConfig::from_partial(Some(json!({
            "login": { "enabled": true, "fields": ["email", "password"] }
        })))
        .unwrap();
        assert_eq!(
            config.login.fields,
            Some(vec!["email".to_string(), "password".to_string()])
        );
    }

    #[test]
    fn test_null_section_is_rejected() {
        let result = ApiRoutesConfig::from_partial(Some(json!({ "login": null })));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_path() {
        let result = ApiRoutesConfig::from_partial(Some(json!({ "user": { "path": "me" } })));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_capture_syntax_in_path_is_rejected() {
        for path in ["/:id", "/{", "/users/{id}", "/*rest", "/a}"] {
            let result = ApiRoutesConfig::from_partial(Some(json!({ "user": { "path": path } })));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue(_))),
                "{path} should be rejected"
            );
        }
        assert!(
            ApiRoutesConfig::from_partial(Some(json!({ "user": { "path": "/users/me" } }))).is_ok()
        );
    }

    #[test]
    fn test_default_matches_section_defaults() {
        let config = ApiRoutesConfig::default();
        assert_eq!(config.login, LoginRoute::default());
        assert_eq!(config.register, RegisterRoute::default());
        assert_eq!(config.logout, LogoutRoute::default());
        assert_eq!(config.user, UserRoute::default());
    }

    #[test]
    fn test_invalid_unauthenticated_status() {
        let result = ApiRoutesConfig::from_partial(Some(json!({
            "user": { "unauthenticatedStatus": 500 }
        })));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        let config = ApiRoutesConfig::from_partial(Some(json!({
            "user": { "unauthenticatedStatus": 403 }
        })))
        .unwrap();
        assert_eq!(
            config.user.unauthenticated_status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_enabled_login_needs_lookup_fields() {
        let result = ApiRoutesConfig::from_partial(Some(json!({
            "login": { "enabled": true, "findBy": [] }
        })));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_login_and_register_paths_must_differ() {
        let result = ApiRoutesConfig::from_partial(Some(json!({
            "login": { "enabled": true, "path": "/session" },
            "register": { "enabled": true, "path": "/session" }
        })));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        // fine while one of them is disabled
        assert!(
            ApiRoutesConfig::from_partial(Some(json!({
                "login": { "enabled": true, "path": "/session" },
                "register": { "path": "/session" }
            })))
            .is_ok()
        );
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
[login]
enabled = true
findBy = ["username"]

[register]
enabled = true
allowOnLogged = true
"#;

        let config = ApiRoutesConfig::from_toml(toml_str).unwrap();
        assert!(config.login.enabled);
        assert_eq!(config.login.find_by, vec!["username"]);
        assert!(config.register.enabled);
        assert!(config.register.allow_on_logged);
        assert!(config.register.auto_login);
    }
}
