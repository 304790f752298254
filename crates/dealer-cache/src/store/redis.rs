//! Redis store implementation for the Dealer Cache
//!
//! Every operation is a direct command against the shared Redis instance.
//! Nothing is cached in-process.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use tracing::info;
use url::Url;

use crate::store::traits::{CasOutcome, KeyValueStore, StoreError, StoreResult};
use config::RedisConfig;

/// Server-side compare-and-set on a single hash field.
///
/// Returns 1 when swapped, 0 on mismatch and -1 when the field is absent.
const HASH_CAS_SCRIPT: &str = r"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if not current then
    return -1
end
if current == ARGV[2] then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
    return 1
end
return 0
";

fn redis_err(e: redis::RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::RedisError(e.to_string())
    }
}

/// Build the connection URL for a Redis config
pub fn connection_url(config: &RedisConfig) -> StoreResult<Url> {
    let mut url = Url::parse(&format!(
        "redis://{}:{}/{}",
        config.host, config.port, config.db_index
    ))
    .map_err(|e| StoreError::Connection(format!("invalid Redis address: {}", e)))?;

    if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
        url.set_password(Some(password))
            .map_err(|_| StoreError::Connection("cannot set Redis password".to_string()))?;
    }

    Ok(url)
}

/// Redis-backed key-value store
///
/// Holds a multiplexed connection manager that reconnects on failure.
/// Cloning the manager per command is cheap and lets concurrent callers
/// share the one connection.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    cas_script: Script,
}

impl RedisStore {
    /// Connect to the Redis instance described by `config`
    pub async fn new(config: &RedisConfig) -> StoreResult<Self> {
        info!(
            host = %config.host,
            port = config.port,
            db = config.db_index,
            "Connecting to Redis"
        );
        let url = connection_url(config)?;
        Self::from_url(url.as_str()).await
    }

    /// Connect using a `redis://` URL
    pub async fn from_url(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url).map_err(redis_err)?;
        let connection = client.get_connection_manager().await.map_err(redis_err)?;

        Ok(Self {
            connection,
            cas_script: Script::new(HASH_CAS_SCRIPT),
        })
    }

    fn conn(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.conn().get(key).await.map_err(redis_err)
    }

    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.conn().set(key, value).await.map_err(redis_err)
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        self.conn().hget(key, field).await.map_err(redis_err)
    }

    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<()> {
        let _: i64 = self.conn().hset(key, field, value).await.map_err(redis_err)?;
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        let removed: i64 = self.conn().hdel(key, field).await.map_err(redis_err)?;
        Ok(removed > 0)
    }

    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.conn().hexists(key, field).await.map_err(redis_err)
    }

    async fn hkeys(&self, key: &str) -> StoreResult<Vec<String>> {
        self.conn().hkeys(key).await.map_err(redis_err)
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, Vec<u8>>> {
        self.conn().hgetall(key).await.map_err(redis_err)
    }

    async fn hcompare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &[u8],
        value: &[u8],
    ) -> StoreResult<CasOutcome> {
        let mut conn = self.conn();
        let reply: i64 = self
            .cas_script
            .key(key)
            .arg(field)
            .arg(expected)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_err)?;

        match reply {
            1 => Ok(CasOutcome::Swapped),
            0 => Ok(CasOutcome::Mismatch),
            -1 => Ok(CasOutcome::Missing),
            other => Err(StoreError::UnexpectedReply(format!(
                "compare-and-set returned {}",
                other
            ))),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;
        if reply != "PONG" {
            return Err(StoreError::UnexpectedReply(reply));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_config(password: Option<&str>) -> RedisConfig {
        RedisConfig {
            host: "cache.internal".to_string(),
            port: 6380,
            password: password.map(str::to_string),
            db_index: 2,
        }
    }

    #[test]
    fn test_connection_url_without_password() {
        let url = connection_url(&redis_config(None)).unwrap();
        assert_eq!(url.as_str(), "redis://cache.internal:6380/2");
    }

    #[test]
    fn test_connection_url_with_password() {
        let url = connection_url(&redis_config(Some("s3cr3t"))).unwrap();
        assert_eq!(url.password(), Some("s3cr3t"));
        assert_eq!(url.host_str(), Some("cache.internal"));
        assert_eq!(url.port(), Some(6380));
    }

    #[test]
    fn test_empty_password_is_ignored() {
        let url = connection_url(&redis_config(Some(""))).unwrap();
        assert_eq!(url.password(), None);
    }

    /// Requires a running Redis at `DEALER_TEST_REDIS_URL`
    #[tokio::test]
    #[ignore]
    async fn test_redis_compare_and_set() {
        let url = std::env::var("DEALER_TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string());
        let store = RedisStore::from_url(&url).await.unwrap();
        store.ping().await.unwrap();

        let field = uuid::Uuid::new_v4().to_string();
        assert_eq!(
            store.hcompare_and_set("CAS_TEST", &field, b"a", b"b").await.unwrap(),
            CasOutcome::Missing
        );
        store.hset("CAS_TEST", &field, b"a").await.unwrap();
        assert_eq!(
            store.hcompare_and_set("CAS_TEST", &field, b"x", b"b").await.unwrap(),
            CasOutcome::Mismatch
        );
        assert_eq!(
            store.hcompare_and_set("CAS_TEST", &field, b"a", b"b").await.unwrap(),
            CasOutcome::Swapped
        );
        assert_eq!(store.hget("CAS_TEST", &field).await.unwrap(), Some(b"b".to_vec()));
        assert!(store.hdel("CAS_TEST", &field).await.unwrap());
    }
}
