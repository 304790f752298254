use crate::*;
use thiserror::Error;

const STORE_TYPES: [&str; 4] = ["redis", "memory", "inmemory", "in_memory"];
const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Redis host is required")]
    MissingRedisHost,

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} must be a positive number, got: {value}")]
    InvalidPositiveFloat { field: String, value: f64 },

    #[error("Invalid store type '{0}'. Must be one of: redis, memory")]
    InvalidStoreType(String),

    #[error("Invalid log format '{0}'. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Database: {message}")]
    InvalidDatabase { message: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

pub fn validate_config(config: &DealerConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_redis(&config.redis, &mut report);
    validate_cache(&config.cache, &mut report);
    validate_logging(&config.logging, &mut report);
    if let Some(ref database) = config.database {
        validate_database(database, &mut report);
    }

    report
}

fn validate_redis(redis: &RedisConfig, report: &mut ValidationReport) {
    if redis.host.trim().is_empty() {
        report.add_error(ValidationError::MissingRedisHost);
    } else if has_unresolved_env_vars(&redis.host) {
        report.add_warning("redis.host", "contains an unresolved environment variable");
    }

    if redis.port == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "redis.port".to_string(),
        });
    }

    if let Some(ref password) = redis.password {
        if has_unresolved_env_vars(password) {
            report.add_warning("redis.password", "contains an unresolved environment variable");
        }
    }

    if redis.db_index > 15 {
        report.add_warning(
            "redis.db_index",
            "index above 15 requires a server with more than the default 16 databases",
        );
    }
}

fn validate_cache(cache: &CacheSettings, report: &mut ValidationReport) {
    if !STORE_TYPES.contains(&cache.store.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidStoreType(cache.store.clone()));
    }

    if !(cache.default_max_age_seconds.is_finite() && cache.default_max_age_seconds > 0.0) {
        report.add_error(ValidationError::InvalidPositiveFloat {
            field: "cache.default_max_age_seconds".to_string(),
            value: cache.default_max_age_seconds,
        });
    }

    if cache.max_update_retries == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "cache.max_update_retries".to_string(),
        });
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !LOG_FORMATS.contains(&logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}

fn validate_database(database: &DatabaseConfig, report: &mut ValidationReport) {
    if database.host.trim().is_empty() {
        report.add_error(ValidationError::InvalidDatabase {
            message: "host is required".to_string(),
        });
    }

    if database.database.trim().is_empty() {
        report.add_error(ValidationError::InvalidDatabase {
            message: "database name is required".to_string(),
        });
    }

    if database.user.trim().is_empty() {
        report.add_error(ValidationError::InvalidDatabase {
            message: "user is required".to_string(),
        });
    }

    if database.max_connections == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "database.max_connections".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> DealerConfig {
        DealerConfig {
            redis: RedisConfig::default(),
            cache: CacheSettings::default(),
            logging: LoggingConfig::default(),
            database: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&valid_config());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid_config();
        config.redis.host = " ".to_string();
        config.redis.port = 0;
        config.cache.store = "memcached".to_string();
        config.cache.default_max_age_seconds = 0.0;
        config.cache.max_update_retries = 0;
        config.logging.format = "xml".to_string();

        let report = validate_config(&config);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 6);
        assert!(report.errors.contains(&ValidationError::MissingRedisHost));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidStoreType("memcached".to_string())));
    }

    #[test]
    fn test_unresolved_password_is_a_warning() {
        let mut config = valid_config();
        config.redis.password = Some("${UNSET_DEALER_PASSWORD}".to_string());

        let report = validate_config(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "redis.password");
    }

    #[test]
    fn test_database_section_checked_when_present() {
        let mut config = valid_config();
        config.database = Some(DatabaseConfig {
            host: "db".to_string(),
            port: 3306,
            database: String::new(),
            user: "dealer".to_string(),
            password: None,
            max_connections: 0,
        });

        let report = validate_config(&config);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_store_type_is_case_insensitive() {
        let mut config = valid_config();
        config.cache.store = "Memory".to_string();
        assert!(validate_config(&config).is_valid());
    }
}
