//! Signed, throttle-aware and cached requests to the Product Advertising API.
//!
//! This crate bundles the pasign crates behind cargo features:
//!
//! - `aws`: the SigV4 signer, re-exported as [`aws`].
//! - `paapi`: the retrying, caching executor, re-exported as [`paapi`].
//! - `default-context`: tokio and reqwest implementations of every
//!   [`Context`] collaborator plus [`default_context`].
//!
//! ```no_run
//! # async fn example() -> pasign::Result<()> {
//! use pasign::paapi::{Config, Executor};
//! use serde_json::json;
//!
//! let ctx = pasign::default_context();
//! let config = Config::default().from_env(&ctx);
//! let executor = Executor::new(ctx, config)?;
//!
//! let resp = executor
//!     .execute(json!({"Keywords": "widget"}))
//!     .await?
//!     .into_result()?;
//! println!("{:?}", resp.body.get("SearchResult"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use pasign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;
#[cfg(feature = "default-context")]
pub use pasign_cache_file_tokio::FileCacheStore;
#[cfg(feature = "default-context")]
pub use pasign_http_send_reqwest::ReqwestHttpSend;
#[cfg(feature = "default-context")]
pub use pasign_sleep_tokio::TokioSleep;

#[cfg(feature = "aws")]
pub mod aws {
    pub use pasign_aws_v4::*;
}

#[cfg(feature = "paapi")]
pub mod paapi;
