//! Signed, throttle-aware and cached Product Advertising API 5 requests.
//!
//! ```no_run
//! use pasign_core::{Context, MemoryCacheStore, OsEnv};
//! use pasign_paapi::{Config, Executor, Operation, RetryOutcome};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # async fn example(ctx: Context) -> pasign_core::Result<()> {
//! let ctx = ctx.with_env(OsEnv).with_cache_store(MemoryCacheStore::default());
//! let config = Config {
//!     cache_ttl: Some(Duration::from_secs(1800)),
//!     ..Default::default()
//! }
//! .with_operation(Operation::SearchItems)
//! .from_env(&ctx);
//!
//! let executor = Executor::new(ctx, config)?;
//! match executor.execute(json!({"Keywords": "widget"})).await? {
//!     RetryOutcome::Success(resp) => println!("{}", resp.body.len()),
//!     RetryOutcome::Rejected(err) => println!("rejected: {err}"),
//!     other => return other.into_result().map(|_| ()),
//! }
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;
pub use config::Operation;

mod payload;
pub use payload::canonical_json;
pub use payload::PreparedPayload;

mod cache;
pub use cache::ResponseCache;

mod outcome;
pub use outcome::ApiError;
pub use outcome::BatchResponse;
pub use outcome::Response;
pub use outcome::RetryOutcome;

mod observer;
pub use observer::Event;
pub use observer::LogObserver;
pub use observer::Observe;

mod executor;
pub use executor::Executor;
