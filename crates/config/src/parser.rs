use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

pub const ENV_REDIS_HOST: &str = "DEALER_REDIS_HOST";
pub const ENV_REDIS_PORT: &str = "DEALER_REDIS_PORT";
pub const ENV_REDIS_PASSWORD: &str = "DEALER_REDIS_PASSWORD";
pub const ENV_REDIS_DB: &str = "DEALER_REDIS_DB";

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DealerConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    parse_config(&content)
}

/// Parse YAML text after environment variable substitution
pub fn parse_config(content: &str) -> Result<DealerConfig> {
    let substituted = substitution::substitute_env_vars(content);
    debug!("Environment variable substitution completed");

    let config: DealerConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> DealerConfig {
    DealerConfig {
        redis: RedisConfig {
            host: default_redis_host(),
            port: default_redis_port(),
            password: Some("${DEALER_REDIS_PASSWORD}".to_string()),
            db_index: 0,
        },
        cache: CacheSettings::default(),
        logging: LoggingConfig::default(),
        database: None,
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &DealerConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

impl DealerConfig {
    /// Build a configuration from `DEALER_REDIS_*` variables alone
    ///
    /// Missing variables fall back to the defaults; an empty password
    /// means no authentication.
    pub fn from_env() -> Result<Self> {
        let host = get_env_or_default(ENV_REDIS_HOST, &default_redis_host());
        let port = get_env_or_default(ENV_REDIS_PORT, &default_redis_port().to_string())
            .parse::<u16>()
            .with_context(|| format!("{} must be a port number", ENV_REDIS_PORT))?;
        let db_index = get_env_or_default(ENV_REDIS_DB, "0")
            .parse::<u8>()
            .with_context(|| format!("{} must be a small integer", ENV_REDIS_DB))?;
        let password = Some(get_env_or_default(ENV_REDIS_PASSWORD, "")).filter(|p| !p.is_empty());

        Ok(Self {
            redis: RedisConfig {
                host,
                port,
                password,
                db_index,
            },
            cache: CacheSettings::default(),
            logging: LoggingConfig::default(),
            database: None,
        })
    }
}
