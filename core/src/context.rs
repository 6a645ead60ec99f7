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

use crate::cache::{CacheEntry, CacheStore};
use crate::time::{self, DateTime};
use crate::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Context carries every collaborator that talks to the outside world.
///
/// ## Important
///
/// pasign provides NO default transport. Users MUST configure the components they need.
/// Any unconfigured component will use a no-op implementation that returns errors or
/// empty values when called. The only exception is the clock, which defaults to the
/// system UTC clock.
///
/// ## Example
///
/// ```
/// use pasign_core::{Context, MemoryCacheStore, OsEnv};
///
/// let ctx = Context::new()
///     .with_env(OsEnv)
///     .with_cache_store(MemoryCacheStore::default());
/// ```
#[derive(Clone)]
pub struct Context {
    http: Arc<dyn HttpSend>,
    sleep: Arc<dyn Sleep>,
    clock: Arc<dyn Clock>,
    env: Arc<dyn Env>,
    cache: Arc<dyn CacheStore>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("http", &self.http)
            .field("sleep", &self.sleep)
            .field("clock", &self.clock)
            .field("env", &self.env)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations and the system clock.
    ///
    /// Use the `with_*` methods to configure the components you need.
    pub fn new() -> Self {
        Self {
            http: Arc::new(NoopHttpSend),
            sleep: Arc::new(NoopSleep),
            clock: Arc::new(SystemClock),
            env: Arc::new(NoopEnv),
            cache: Arc::new(NoopCacheStore),
        }
    }

    /// Replace the HTTP client implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replace the sleeper used between throttled attempts.
    pub fn with_sleep(mut self, sleep: impl Sleep) -> Self {
        self.sleep = Arc::new(sleep);
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Replace the response cache storage.
    pub fn with_cache_store(mut self, cache: impl CacheStore) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    /// Send http request and return the response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Suspend the current task for `dur`.
    #[inline]
    pub async fn sleep(&self, dur: Duration) -> Result<()> {
        self.sleep.sleep(dur).await
    }

    /// Current UTC time according to the configured clock.
    #[inline]
    pub fn now(&self) -> DateTime {
        self.clock.now()
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables visible to this context.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }

    /// Load a cache entry by key.
    #[inline]
    pub async fn cache_load(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.cache.load(key).await
    }

    /// Store a cache entry under key, replacing any previous entry.
    #[inline]
    pub async fn cache_store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.cache.store(key, entry).await
    }

    /// Remove the cache entry under key if present.
    #[inline]
    pub async fn cache_remove(&self, key: &str) -> Result<()> {
        self.cache.remove(key).await
    }
}

/// HttpSend is the transport used to deliver signed requests.
///
/// Implementations should not retry on their own: any `Err` returned here is
/// surfaced to the caller as a transport failure.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Sleep suspends the caller between attempts.
#[async_trait::async_trait]
pub trait Sleep: Debug + Send + Sync + 'static {
    /// Suspend for `dur`.
    async fn sleep(&self, dur: Duration) -> Result<()>;
}

/// Clock reports the current UTC time.
pub trait Clock: Debug + Send + Sync + 'static {
    /// Current time.
    fn now(&self) -> DateTime;
}

/// Permits parameterizing environment access.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables of the current process.
    fn vars(&self) -> HashMap<String, String>;
}

/// Implements Env for the OS process environment.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }
}

/// StaticEnv provides a static env environment.
///
/// This is useful for testing or for providing a fixed environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The environment variables to use.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }
}

/// SystemClock reads the wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        time::now()
    }
}

/// FixedClock always reports the same instant.
///
/// Signing with a fixed instant makes signatures reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}

/// NoopHttpSend is a no-op implementation that always returns an error.
///
/// This is used when no HTTP client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::transport(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}

/// NoopSleep is a no-op implementation that always returns an error.
///
/// This is used when no sleeper is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleep;

#[async_trait::async_trait]
impl Sleep for NoopSleep {
    async fn sleep(&self, _dur: Duration) -> Result<()> {
        Err(Error::unexpected(
            "sleeping not supported: no sleeper configured",
        ))
    }
}

/// NoopEnv is a no-op implementation that always returns None/empty.
///
/// This is used when no environment is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// NoopCacheStore never holds anything: loads miss and stores are discarded.
///
/// This is used when caching is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheStore;

#[async_trait::async_trait]
impl CacheStore for NoopCacheStore {
    async fn load(&self, _key: &str) -> Result<Option<CacheEntry>> {
        Ok(None)
    }

    async fn store(&self, _key: &str, _entry: CacheEntry) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
