//! Product Advertising API support with convenience APIs.

pub use pasign_paapi::*;

#[cfg(feature = "default-context")]
use crate::{default_context, FileCacheStore, Result};
#[cfg(feature = "default-context")]
use std::path::Path;
#[cfg(feature = "default-context")]
use std::time::Duration;

/// Create an executor over [`default_context`] configured from `PAAPI_*`
/// environment variables.
///
/// Fields already set in `config` take precedence over the environment.
#[cfg(feature = "default-context")]
pub fn default_executor(config: Config) -> Result<Executor> {
    let ctx = default_context();
    let config = config.from_env(&ctx);
    Executor::new(ctx, config)
}

/// Like [`default_executor`], caching successful responses as files under
/// `dir` for `ttl`.
#[cfg(feature = "default-context")]
pub fn default_cached_executor(
    config: Config,
    dir: impl AsRef<Path>,
    ttl: Duration,
) -> Result<Executor> {
    let ctx = default_context().with_cache_store(FileCacheStore::new(dir));
    let config = Config {
        cache_ttl: Some(ttl),
        ..config
    }
    .from_env(&ctx);
    Executor::new(ctx, config)
}
