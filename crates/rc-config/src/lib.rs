//! Registry Console Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub auth0: Auth0Config,
    pub console: ConsoleConfig,

    /// Enable development mode
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            mongodb: MongoConfig::default(),
            auth: AuthConfig::default(),
            auth0: Auth0Config::default(),
            console: ConsoleConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:4200".to_string()],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "registry".to_string(),
        }
    }
}

/// Operator authentication (JWT bearer or session cookie)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// HS256 signing secret
    pub secret_key: String,
    pub session_cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "registry-console".to_string(),
            audience: "registry-console".to_string(),
            secret_key: String::new(),
            session_cookie_name: "rc_session".to_string(),
        }
    }
}

/// Auth0 Management API and dashboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Auth0Config {
    /// Tenant domain, e.g. `my-tenant.eu.auth0.com`
    pub domain: String,
    /// Overrides `https://{domain}` (used by tests and proxies)
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Management API audience; defaults to `https://{domain}/api/v2/`
    pub audience: String,
    pub dashboard_region: String,
    pub dashboard_tenant: String,
    pub request_timeout_secs: u64,
}

impl Default for Auth0Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            base_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            audience: String::new(),
            dashboard_region: "eu".to_string(),
            dashboard_tenant: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Auth0Config {
    pub fn is_configured(&self) -> bool {
        !(self.domain.is_empty() && self.base_url.is_empty())
    }

    pub fn effective_base_url(&self) -> String {
        if self.base_url.is_empty() {
            format!("https://{}", self.domain)
        } else {
            self.base_url.trim_end_matches('/').to_string()
        }
    }

    pub fn effective_audience(&self) -> String {
        if self.audience.is_empty() {
            format!("https://{}/api/v2/", self.domain)
        } else {
            self.audience.clone()
        }
    }
}

/// Admin console behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Expose client secrets on the app detail page (never in production)
    pub show_client_secrets: bool,
    pub default_page_size: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            show_client_secrets: false,
            default_page_size: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.console.default_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "console.default_page_size must be greater than 0".to_string(),
            ));
        }
        if self.mongodb.database.is_empty() {
            return Err(ConfigError::ValidationError("mongodb.database is required".to_string()));
        }
        if !self.dev_mode && self.auth.secret_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.secret_key is required outside of dev mode".to_string(),
            ));
        }
        if self.auth0.is_configured() && self.auth0.client_id.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth0.client_id is required when auth0 is configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Registry Console Configuration
# Environment variables (REGISTRY_CONSOLE_*) override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:4200"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "registry"

[auth]
issuer = "registry-console"
audience = "registry-console"
secret_key = ""
session_cookie_name = "rc_session"

[auth0]
domain = ""
client_id = ""
client_secret = ""
dashboard_region = "eu"
dashboard_tenant = ""
request_timeout_secs = 30

[console]
show_client_secrets = false
default_page_size = 30
"#
        .to_string()
    }
}
