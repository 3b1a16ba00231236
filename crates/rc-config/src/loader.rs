//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "registry-console.toml",
    "./config/config.toml",
    "/etc/registry-console/config.toml",
];

const ENV_PREFIX: &str = "REGISTRY_CONSOLE_";

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(format!("{ENV_PREFIX}{key}")).ok());

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("REGISTRY_CONSOLE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS.iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply overrides from a key lookup. Keys are given without the
/// `REGISTRY_CONSOLE_` prefix; unparsable numeric and boolean values are ignored.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // MongoDB
    if let Some(val) = lookup("MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Auth
    if let Some(val) = lookup("JWT_ISSUER") {
        config.auth.issuer = val;
    }
    if let Some(val) = lookup("JWT_AUDIENCE") {
        config.auth.audience = val;
    }
    if let Some(val) = lookup("JWT_SECRET") {
        config.auth.secret_key = val;
    }

    // Auth0
    if let Some(val) = lookup("AUTH0_DOMAIN") {
        config.auth0.domain = val;
    }
    if let Some(val) = lookup("AUTH0_BASE_URL") {
        config.auth0.base_url = val;
    }
    if let Some(val) = lookup("AUTH0_CLIENT_ID") {
        config.auth0.client_id = val;
    }
    if let Some(val) = lookup("AUTH0_CLIENT_SECRET") {
        config.auth0.client_secret = val;
    }
    if let Some(val) = lookup("AUTH0_DASHBOARD_TENANT") {
        config.auth0.dashboard_tenant = val;
    }
    if let Some(val) = lookup("AUTH0_DASHBOARD_REGION") {
        config.auth0.dashboard_region = val;
    }

    // Console
    if let Some(show) = lookup("SHOW_CLIENT_SECRETS").and_then(|v| v.parse().ok()) {
        config.console.show_client_secrets = show;
    }
    if let Some(size) = lookup("DEFAULT_PAGE_SIZE").and_then(|v| v.parse().ok()) {
        config.console.default_page_size = size;
    }

    if let Some(dev) = lookup("DEV_MODE").and_then(|v| v.parse().ok()) {
        config.dev_mode = dev;
    }
}
