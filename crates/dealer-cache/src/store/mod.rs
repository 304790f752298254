//! Store module for the Dealer Cache
//!
//! This module provides the key-value store trait and its implementations.

mod memory;
mod redis;
mod traits;

pub use self::redis::{connection_url, RedisStore};
pub use memory::InMemoryStore;
pub use traits::*;

use std::sync::Arc;
use tracing::info;

/// Store type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    /// In-memory store (process-local, non-persistent)
    InMemory,
    /// Redis store (shared)
    Redis,
}

impl StoreType {
    /// Parse store type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inmemory" | "in_memory" | "memory" => Some(StoreType::InMemory),
            "redis" => Some(StoreType::Redis),
            _ => None,
        }
    }
}

/// Shared handle to any store backend
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Create a store based on configuration
pub async fn create_store(
    store_type: StoreType,
    redis_config: &config::RedisConfig,
) -> StoreResult<SharedStore> {
    match store_type {
        StoreType::InMemory => {
            info!("Creating in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreType::Redis => {
            info!("Creating Redis store");
            Ok(Arc::new(RedisStore::new(redis_config).await?))
        }
    }
}

/// Create a store from the dealer configuration
///
/// Unknown store names fall back to Redis, the production backend.
pub async fn create_store_from_config(config: &config::DealerConfig) -> StoreResult<SharedStore> {
    let store_type = StoreType::parse(&config.cache.store).unwrap_or(StoreType::Redis);
    create_store(store_type, &config.redis).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_parse() {
        assert_eq!(StoreType::parse("Redis"), Some(StoreType::Redis));
        assert_eq!(StoreType::parse("memory"), Some(StoreType::InMemory));
        assert_eq!(StoreType::parse("in_memory"), Some(StoreType::InMemory));
        assert_eq!(StoreType::parse("postgres"), None);
    }

    #[tokio::test]
    async fn test_create_in_memory_store() {
        let store = create_store(StoreType::InMemory, &config::RedisConfig::default())
            .await
            .unwrap();
        store.set("k", b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
