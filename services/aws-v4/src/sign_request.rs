use crate::constants::{AWS4_HMAC_SHA256, AWS4_KEY_PREFIX, AWS4_REQUEST, X_AMZ_DATE};
use crate::{Credential, Scope};
use async_trait::async_trait;
use bytes::Bytes;
use http::header;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue};
use log::debug;
use pasign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use pasign_core::time::{format_date, format_iso8601, DateTime};
use pasign_core::{Context, Error, Result, SignRequest};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

/// A request reduced to the parts that take part in the signature.
///
/// Header names are lowercased and values trimmed on insertion; iteration
/// is always in ascending byte order of the name, which is the order the
/// server uses when it re-derives the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableRequest {
    /// HTTP method.
    pub method: String,
    /// URI path, without query.
    pub path: String,
    /// Headers to sign.
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes.
    pub payload: Bytes,
}

impl SignableRequest {
    /// Create a request with no headers and an empty body.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            headers: BTreeMap::new(),
            payload: Bytes::new(),
        }
    }

    /// Add a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Set the body.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Insert a header, replacing any previous value for the same name.
    pub fn insert_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.trim().to_string());
    }

    /// Header names joined by `;`, the `SignedHeaders` list.
    pub fn signed_headers(&self) -> String {
        self.headers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Headers produced by signing: every signed header plus `authorization`.
///
/// Iteration yields the signed headers in sorted order followed by
/// `authorization`, matching the order listed in its `SignedHeaders` field.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    headers: BTreeMap<String, String>,
    authorization: String,
}

impl SignedHeaders {
    /// Value of a signed header, or of `authorization`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        if name == header::AUTHORIZATION.as_str() {
            return Some(&self.authorization);
        }
        self.headers.get(&name).map(String::as_str)
    }

    /// The `Authorization` header value.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// The `x-amz-date` header value.
    pub fn amz_date(&self) -> &str {
        self.headers
            .get(X_AMZ_DATE)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Iterate over all headers in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once((
                header::AUTHORIZATION.as_str(),
                self.authorization.as_str(),
            )))
    }

    /// Number of headers, `authorization` included.
    pub fn len(&self) -> usize {
        self.headers.len() + 1
    }

    /// Always false: `authorization` is present.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Debug for SignedHeaders {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedHeaders")
            .field("headers", &self.headers)
            .field("authorization", &"<redacted>")
            .finish()
    }
}

/// Key derived from the secret for one scope.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Sign `req` at `now`.
///
/// `x-amz-date` is set from `now`, overriding any value already present, and
/// an incoming `authorization` header is never signed. `scope.date` must be
/// the UTC date of `now`.
pub fn sign(
    cred: &Credential,
    scope: &Scope,
    req: &SignableRequest,
    now: DateTime,
) -> Result<SignedHeaders> {
    let amz_date = format_iso8601(now);
    if scope.date != format_date(now) {
        return Err(Error::request_invalid(format!(
            "scope date {} does not match signing time {amz_date}",
            scope.date
        )));
    }

    let mut req = req.clone();
    req.headers.remove(header::AUTHORIZATION.as_str());
    req.insert_header(X_AMZ_DATE, &amz_date);

    let creq = canonical_request_string(&req);
    debug!("calculated canonical request: {creq}");

    let string_to_sign = string_to_sign(&amz_date, scope, &creq);
    debug!("calculated string to sign: {string_to_sign}");

    let signing_key = generate_signing_key(&cred.secret_access_key, scope);
    let signature = hex_hmac_sha256(signing_key.as_bytes(), string_to_sign.as_bytes());

    let authorization = format!(
        "{AWS4_HMAC_SHA256} Credential={}/{}, SignedHeaders={}, Signature={}",
        cred.access_key_id,
        scope.credential_scope(),
        req.signed_headers(),
        signature
    );

    Ok(SignedHeaders {
        headers: req.headers,
        authorization,
    })
}

/// Build the canonical request:
///
/// ```text
/// POST
/// /paapi5/searchitems
///
/// content-encoding:amz-1.0
/// host:webservices.amazon.com
/// x-amz-date:20220313T072004Z
///
/// content-encoding;host;x-amz-date
/// <hex sha256 of body>
/// ```
pub fn canonical_request_string(req: &SignableRequest) -> String {
    // 512 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(512);

    f.push_str(&req.method);
    f.push('\n');
    f.push_str(&req.path);
    // No query string in this protocol, the line stays empty.
    f.push_str("\n\n");
    for (name, value) in req.headers.iter() {
        f.push_str(name);
        f.push(':');
        f.push_str(value);
        f.push('\n');
    }
    f.push('\n');
    f.push_str(&req.signed_headers());
    f.push('\n');
    f.push_str(&hex_sha256(&req.payload));

    f
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(amz_date: &str, scope: &Scope, canonical_request: &str) -> String {
    format!(
        "{AWS4_HMAC_SHA256}\n{amz_date}\n{}\n{}",
        scope.credential_scope(),
        hex_sha256(canonical_request.as_bytes())
    )
}

/// Derive the signing key for `scope`.
pub fn generate_signing_key(secret: &str, scope: &Scope) -> SigningKey {
    // Sign secret
    let secret = format!("{AWS4_KEY_PREFIX}{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), scope.date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(&sign_date, scope.region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(&sign_region, scope.service.as_bytes());
    // Sign request
    SigningKey(hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes()))
}

/// RequestSigner that implements AWS SigV4 for JSON POST APIs.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Only requests without query string are supported.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
        }
    }

    /// Reduce `req` to a [`SignableRequest`], adding `host` from the URI when absent.
    fn signable_request(req: &Parts, body: &Bytes) -> Result<SignableRequest> {
        if req.uri.query().is_some() {
            return Err(Error::request_invalid(
                "request with query string is not supported for signing",
            ));
        }

        let mut signable = SignableRequest::new(req.method.as_str(), req.uri.path())
            .with_payload(body.clone());

        for name in req.headers.keys() {
            let values = req
                .headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str().map(str::trim))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            signable.insert_header(name.as_str(), &values.join(","));
        }

        if !signable.headers.contains_key(header::HOST.as_str()) {
            let authority = req.uri.authority().ok_or_else(|| {
                Error::request_invalid("request without host or authority is invalid for signing")
            })?;
            signable.insert_header(header::HOST.as_str(), authority.as_str());
        }

        Ok(signable)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut Parts,
        body: &Bytes,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Ok(());
        };

        let now = ctx.now();
        let scope = Scope::new(now, &self.region, &self.service);
        debug!("calculated scope: {}", scope.credential_scope());

        let signable = Self::signable_request(req, body)?;
        let signed = sign(cred, &scope, &signable, now)?;

        // Every header was signed, so the map is rebuilt in signed order.
        let mut headers = HeaderMap::with_capacity(signed.len());
        for (name, value) in signed.iter() {
            let mut value = HeaderValue::from_str(value)?;
            if name == header::AUTHORIZATION.as_str() {
                value.set_sensitive(true);
            }
            headers.insert(HeaderName::from_str(name)?, value);
        }
        req.headers = headers;

        Ok(())
    }
}
