//! Configuration loading and management
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional YAML file named by `ORDER_API_CONFIG`, then environment variables.
//!
//! ```yaml
//! environment: production
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! store:
//!   backend: redis
//!   url: redis://cache:6379
//! orders:
//!   reject_duplicates: false
//!   scan_concurrency: 16
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_VAR: &str = "ORDER_API_CONFIG";

/// Deployment environment
///
/// Defaults to production; debug details in error responses need an explicit
/// `development`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    /// Whether error responses carry debug details
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::InvalidValue {
                field: "environment".to_string(),
                value: s.to_string(),
                message: "expected development, production or test".to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage backend kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(ConfigError::InvalidValue {
                field: "store.backend".to_string(),
                value: s.to_string(),
                message: "expected memory or redis".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Connection URL, e.g. `redis://127.0.0.1:6379`
    pub url: Option<String>,
}

/// Repository behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Answer 409 instead of overwriting when an order number already exists
    pub reject_duplicates: bool,

    /// Maximum concurrent fetches during a listing scan
    pub scan_concurrency: usize,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            reject_duplicates: false,
            scan_concurrency: 16,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub orders: OrdersConfig,
}

impl AppConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            file: None,
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// A `REDIS_URL` selects the redis backend unless `STORE_BACKEND` is also
    /// set.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("APP_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: port.clone(),
                message: "expected a port number".to_string(),
            })?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.store.url = Some(url);
            self.store.backend = StoreBackend::Redis;
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        Ok(self)
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orders.scan_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "orders.scan_concurrency".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.store.backend == StoreBackend::Redis {
            if !cfg!(feature = "redis") {
                return Err(ConfigError::InvalidValue {
                    field: "store.backend".to_string(),
                    value: "redis".to_string(),
                    message: "built without the 'redis' feature".to_string(),
                });
            }
            if self.store.url.is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "store.url".to_string(),
                    value: String::new(),
                    message: "redis backend needs a url".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Defaults, then `ORDER_API_CONFIG` if set, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                tracing::info!(%path, "loading config file");
                Self::from_yaml_file(path)?
            }
            Err(_) => Self::default(),
        };
        let config = base.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }
}
