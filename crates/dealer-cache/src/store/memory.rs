//! In-memory store implementation for the Dealer Cache

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::store::traits::{CasOutcome, KeyValueStore, StoreError, StoreResult};

/// In-memory key-value store
///
/// Behaves like a single Redis instance: string keys and hash tables,
/// with every command applied atomically under a lock. Data is lost on
/// drop. Used for tests and local development.
pub struct InMemoryStore {
    /// Plain string keys
    strings: RwLock<HashMap<String, Vec<u8>>>,
    /// Hash tables (outer key -> field -> value)
    hashes: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
    /// Number of commands received
    commands: AtomicU64,
    /// Simulated outage
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self {
            strings: RwLock::new(HashMap::new()),
            hashes: RwLock::new(HashMap::new()),
            commands: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Total number of commands this store has received
    pub fn command_count(&self) -> u64 {
        self.commands.load(Ordering::SeqCst)
    }

    /// Make every subsequent command fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn command(&self) -> StoreResult<()> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("store unavailable".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.command()?;
        Ok(self.strings.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.command()?;
        self.strings.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        self.command()?;
        let hashes = self.hashes.read();
        Ok(hashes.get(key).and_then(|h| h.get(field).cloned()))
    }

    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<()> {
        self.command()?;
        self.hashes
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_vec());
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.command()?;
        let mut hashes = self.hashes.write();
        let (removed, now_empty) = match hashes.get_mut(key) {
            Some(hash) => (hash.remove(field).is_some(), hash.is_empty()),
            None => (false, false),
        };
        // Redis drops a hash once its last field is gone
        if now_empty {
            hashes.remove(key);
        }
        Ok(removed)
    }

    async fn hexists(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.command()?;
        let hashes = self.hashes.read();
        Ok(hashes.get(key).map_or(false, |h| h.contains_key(field)))
    }

    async fn hkeys(&self, key: &str) -> StoreResult<Vec<String>> {
        self.command()?;
        let hashes = self.hashes.read();
        Ok(hashes
            .get(key)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, Vec<u8>>> {
        self.command()?;
        let hashes = self.hashes.read();
        Ok(hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hcompare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &[u8],
        value: &[u8],
    ) -> StoreResult<CasOutcome> {
        self.command()?;
        let mut hashes = self.hashes.write();
        let Some(current) = hashes.get_mut(key).and_then(|h| h.get_mut(field)) else {
            return Ok(CasOutcome::Missing);
        };
        if current.as_slice() != expected {
            return Ok(CasOutcome::Mismatch);
        }
        *current = value.to_vec();
        Ok(CasOutcome::Swapped)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_keys() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("BTC/USD_binance_bid").await.unwrap(), None);

        store.set("BTC/USD_binance_bid", b"[]").await.unwrap();
        assert_eq!(
            store.get("BTC/USD_binance_bid").await.unwrap(),
            Some(b"[]".to_vec())
        );
        assert_eq!(store.command_count(), 3);
    }

    #[tokio::test]
    async fn test_hash_fields() {
        let store = InMemoryStore::new();
        store.hset("ORDER_MARKS", "a", b"1").await.unwrap();
        store.hset("ORDER_MARKS", "b", b"2").await.unwrap();

        assert!(store.hexists("ORDER_MARKS", "a").await.unwrap());
        assert!(!store.hexists("ORDER_MARKS", "c").await.unwrap());

        let mut keys = store.hkeys("ORDER_MARKS").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.hgetall("ORDER_MARKS").await.unwrap().len(), 2);

        assert!(store.hdel("ORDER_MARKS", "a").await.unwrap());
        assert!(!store.hdel("ORDER_MARKS", "a").await.unwrap());
        assert_eq!(store.hget("ORDER_MARKS", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_compare_and_set() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.hcompare_and_set("H", "f", b"old", b"new").await.unwrap(),
            CasOutcome::Missing
        );

        store.hset("H", "f", b"old").await.unwrap();
        assert_eq!(
            store.hcompare_and_set("H", "f", b"other", b"new").await.unwrap(),
            CasOutcome::Mismatch
        );
        assert_eq!(store.hget("H", "f").await.unwrap(), Some(b"old".to_vec()));

        assert_eq!(
            store.hcompare_and_set("H", "f", b"old", b"new").await.unwrap(),
            CasOutcome::Swapped
        );
        assert_eq!(store.hget("H", "f").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.ping().await, Err(StoreError::Connection(_))));
        assert!(store.hkeys("ORDER_MARKS").await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
