//! Storage for previously decoded responses.

use crate::time::DateTime;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use std::time::Duration;

/// A decoded response kept under its payload fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The JSON value handed back to the caller.
    pub value: serde_json::Value,
    /// When the entry was written.
    pub created_at: DateTime,
    /// How long the entry stays alive after `created_at`.
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create a new entry written at `created_at`.
    pub fn new(value: serde_json::Value, created_at: DateTime, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl,
        }
    }

    /// An entry is expired once `now` reaches `created_at + ttl`.
    ///
    /// A ttl too large to represent never expires.
    pub fn is_expired(&self, now: DateTime) -> bool {
        match chrono::TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
        {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// CacheStore is the key-value medium behind the response cache.
///
/// Stores do not interpret ttl; expiry is decided by the reader. Concurrent
/// `store` calls for the same key may race, the last writer wins.
#[async_trait::async_trait]
pub trait CacheStore: Debug + Send + Sync + 'static {
    /// Load the entry stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()>;

    /// Remove the entry under `key`; removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process cache store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().expect("lock poisoned").get(key).cloned())
    }

    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().expect("lock poisoned").remove(key);
        Ok(())
    }
}
