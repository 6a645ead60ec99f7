use log::debug;
use pasign_core::time::format_rfc3339;
use pasign_core::{CacheEntry, Context, Result};
use serde_json::Value;
use std::time::Duration;

/// ResponseCache maps payload fingerprints to decoded responses.
///
/// Storage is whatever [`pasign_core::CacheStore`] the context carries;
/// expiry is decided here against the context clock. Expired entries are
/// removed on read unless a fresh entry has already replaced them.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    ctx: Context,
}

impl ResponseCache {
    /// Create a cache over the store configured in `ctx`.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Look up a live entry.
    pub async fn get(&self, fingerprint: &str) -> Result<Option<Value>> {
        let Some(entry) = self.ctx.cache_load(fingerprint).await? else {
            return Ok(None);
        };

        if entry.is_expired(self.ctx.now()) {
            debug!(
                "cache entry {fingerprint} written at {} has expired",
                format_rfc3339(entry.created_at)
            );
            self.evict(fingerprint, &entry).await?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    /// Remove `expired` unless a newer entry has replaced it since it was read.
    ///
    /// The store has no compare-and-delete, so a `put` landing between the
    /// re-check and the removal can still be lost. That costs one extra miss.
    async fn evict(&self, fingerprint: &str, expired: &CacheEntry) -> Result<()> {
        match self.ctx.cache_load(fingerprint).await? {
            Some(current) if current.created_at == expired.created_at => {
                self.ctx.cache_remove(fingerprint).await
            }
            _ => Ok(()),
        }
    }

    /// Store `value` under `fingerprint`, alive for `ttl` from now.
    pub async fn put(&self, fingerprint: &str, value: Value, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value, self.ctx.now(), ttl);
        self.ctx.cache_store(fingerprint, entry).await
    }
}
