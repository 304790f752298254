//! Store traits for the Dealer Cache
//!
//! This module defines the key-value operations every store backend must
//! provide. The cache only ever talks to the store through this trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors that can occur while talking to the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a hash-field compare-and-set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The field held the expected value and was replaced
    Swapped,
    /// The field held a different value; nothing was written
    Mismatch,
    /// The field does not exist; nothing was written
    Missing,
}

/// Trait for the shared key-value store
///
/// Mirrors the subset of Redis commands the cache relies on: plain string
/// keys and hash tables. Every single-key operation is atomic at the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    // ------------------------------------------------------------------------
    // String keys
    // ------------------------------------------------------------------------

    /// Get the value of a string key
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Set the value of a string key
    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    // ------------------------------------------------------------------------
    // Hash tables
    // ------------------------------------------------------------------------

    /// Get one field of a hash
    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Set one field of a hash
    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<()>;

    /// Delete one field of a hash, returning whether it existed
    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool>;

    /// Check whether a hash field exists
    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool>;

    /// List all field names of a hash
    async fn hkeys(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Fetch every field and value of a hash
    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, Vec<u8>>>;

    /// Atomically replace a hash field if it still holds `expected`
    async fn hcompare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &[u8],
        value: &[u8],
    ) -> StoreResult<CasOutcome>;

    // ------------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------------

    /// Round-trip to the store
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).hget(key, field).await
    }

    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<()> {
        (**self).hset(key, field, value).await
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        (**self).hdel(key, field).await
    }

    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool> {
        (**self).hexists(key, field).await
    }

    async fn hkeys(&self, key: &str) -> StoreResult<Vec<String>> {
        (**self).hkeys(key).await
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, Vec<u8>>> {
        (**self).hgetall(key).await
    }

    async fn hcompare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &[u8],
        value: &[u8],
    ) -> StoreResult<CasOutcome> {
        (**self).hcompare_and_set(key, field, expected, value).await
    }

    async fn ping(&self) -> StoreResult<()> {
        (**self).ping().await
    }
}
