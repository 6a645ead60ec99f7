//! Core components for signing and delivering Product Advertising API requests.
//!
//! This crate provides the foundational types and traits shared by the pasign crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending, sleeping,
//!   the clock, environment access and response cache storage
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and
//!   request signing (`SignRequest`)
//! - **Signer**: The orchestrator that coordinates credential loading and request signing
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::request::Parts;
//! use pasign_core::{Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential { key: "my-key".to_string() }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyBuilder;
//!
//! #[async_trait]
//! impl SignRequest for MyBuilder {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         req: &mut Parts,
//!         _body: &Bytes,
//!         cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         if let Some(cred) = cred {
//!             req.headers.insert("x-my-key", cred.key.parse()?);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MyBuilder);
//!
//! let (mut parts, body) = http::Request::post("https://example.com/")
//!     .body(Bytes::from_static(b"{}"))?
//!     .into_parts();
//! signer.sign(&mut parts, &body).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod cache;
pub use cache::{CacheEntry, CacheStore, MemoryCacheStore};

mod context;
pub use context::{
    Clock, Context, Env, FixedClock, HttpSend, NoopCacheStore, NoopEnv, NoopHttpSend, NoopSleep,
    OsEnv, Sleep, StaticEnv, SystemClock,
};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod signer;
pub use signer::Signer;
