// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tokio-based filesystem cache store for pasign.
//!
//! `FileCacheStore` keeps one JSON file per fingerprint, spread over one
//! level of sub-directories named after the first two characters of the
//! fingerprint:
//!
//! ```text
//! <dir>/3f/3f786850e387550fdab836ed7e6dc881de23001b.json
//! ```
//!
//! Writes go to a temporary file that is renamed into place, so readers
//! never observe a half-written entry and concurrent writers of the same
//! key leave the last complete one.
//!
//! ## Example
//!
//! ```no_run
//! use pasign_cache_file_tokio::FileCacheStore;
//! use pasign_core::Context;
//!
//! let ctx = Context::new().with_cache_store(FileCacheStore::new("/tmp/paapi-cache"));
//! ```

use async_trait::async_trait;
use log::debug;
use pasign_core::{CacheEntry, CacheStore, Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Tokio-based implementation of the `CacheStore` trait.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the file holding `key`.
    ///
    /// Keys are fingerprints; anything outside `[0-9A-Za-z_-]` is refused so
    /// a key can never escape the cache directory.
    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(Error::request_invalid(format!("invalid cache key: {key:?}")));
        }

        let shard = key.get(..2).unwrap_or(key);
        Ok(self.dir.join(shard).join(format!("{key}.json")))
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.path(key)?;
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::unexpected("failed to read cache file").with_source(err))
            }
        };

        let entry = serde_json::from_slice(&content).map_err(|e| {
            Error::unexpected(format!("malformed cache file {}", path.display())).with_source(e)
        })?;
        Ok(Some(entry))
    }

    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::unexpected("failed to create cache directory").with_source(e)
            })?;
        }

        let content = serde_json::to_vec(&entry)?;
        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::unexpected("failed to write cache file").with_source(e))?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::unexpected("failed to move cache file into place").with_source(err));
        }

        debug!("cache file written: {}", path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::unexpected("failed to remove cache file").with_source(err)),
        }
    }
}
