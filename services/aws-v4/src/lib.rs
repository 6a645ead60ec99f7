//! AWS SigV4 signer for JSON POST APIs.
//!
//! ```no_run
//! use chrono::Utc;
//! use pasign_aws_v4::{sign, Credential, Scope, SignableRequest};
//!
//! # fn main() -> pasign_core::Result<()> {
//! let now = Utc::now();
//! let cred = Credential::new("access_key", "secret_key");
//! let scope = Scope::new(now, "us-east-1", "ProductAdvertisingAPI");
//! let req = SignableRequest::new("POST", "/paapi5/searchitems")
//!     .with_header("host", "webservices.amazon.com")
//!     .with_payload(r#"{"Keywords":"widget"}"#);
//!
//! let signed = sign(&cred, &scope, &req, now)?;
//! for (name, value) in signed.iter() {
//!     println!("{name}: {value}");
//! }
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::X_AMZ_DATE;
pub use constants::X_AMZ_TARGET;

mod credential;
pub use credential::Credential;
pub use credential::Scope;

mod provide_credential;
pub use provide_credential::StaticCredentialProvider;

mod sign_request;
pub use sign_request::canonical_request_string;
pub use sign_request::generate_signing_key;
pub use sign_request::sign;
pub use sign_request::string_to_sign;
pub use sign_request::RequestSigner;
pub use sign_request::SignableRequest;
pub use sign_request::SignedHeaders;
pub use sign_request::SigningKey;
