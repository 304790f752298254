//! Configuration for the dealer cache
//!
//! Loaded from a YAML file with `${VAR}` environment substitution, or
//! straight from environment variables.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DealerConfig {
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Order history database (optional)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Which Redis instance the cache binds to
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(rename = "db_index")]
    #[serde(default)]
    pub db_index: u8,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            password: None,
            db_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Store backend: "redis" or "memory"
    #[serde(default = "default_store")]
    pub store: String,
    /// Order book freshness budget used when the caller gives none
    #[serde(rename = "default_max_age_seconds")]
    #[serde(default = "default_max_age_seconds")]
    pub default_max_age_seconds: f64,
    /// Compare-and-set attempts for a quote status update
    #[serde(rename = "max_update_retries")]
    #[serde(default = "default_max_update_retries")]
    pub max_update_retries: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            store: default_store(),
            default_max_age_seconds: default_max_age_seconds(),
            max_update_retries: default_max_update_retries(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

/// MySQL connection for the order history database
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(rename = "max_connections")]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// `mysql://` connection URL
    pub fn connection_url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!(
                "mysql://{}:{}@{}:{}/{}",
                self.user, password, self.host, self.port, self.database
            ),
            None => format!(
                "mysql://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
        }
    }
}
