pub fn default_redis_host() -> String {
    "localhost".to_string()
}

pub fn default_redis_port() -> u16 {
    6379
}

pub fn default_store() -> String {
    "redis".to_string()
}

pub fn default_max_age_seconds() -> f64 {
    20.0
}

pub fn default_max_update_retries() -> u32 {
    16
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_mysql_port() -> u16 {
    3306
}

pub fn default_max_connections() -> u32 {
    5
}
