use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct TeamLogConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `postgres://...` for PostgreSQL, `memory://` for the in-process store.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Create the call log table on first use if it does not exist.
    #[serde(default = "default_true")]
    pub bootstrap_schema: bool,
}

impl DatabaseConfig {
    pub fn memory() -> Self {
        Self {
            url: "memory://".to_string(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            bootstrap_schema: true,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory:")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            timeout_seconds: default_webhook_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_webhook_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl TeamLogConfig {
    /// Load from a TOML file, then apply `TEAMLOG__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("TEAMLOG").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
