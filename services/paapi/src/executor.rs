use crate::cache::ResponseCache;
use crate::constants::*;
use crate::observer::{Event, LogObserver, Observe};
use crate::outcome::{ApiError, BatchResponse, Response, RetryOutcome};
use crate::payload::PreparedPayload;
use crate::Config;
use bytes::Bytes;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE, HOST};
use log::{debug, warn};
use pasign_aws_v4::{Credential, RequestSigner, StaticCredentialProvider, X_AMZ_TARGET};
use pasign_core::{Context, Error, Result, Signer};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// How the attempt loop ended.
enum Exchange {
    /// Upstream answered with something other than a throttle.
    Answered(Map<String, Value>, Option<ApiError>),
    /// Still throttled after this many attempts.
    Throttled(u32),
    /// Transport failure or undecodable body.
    Failed(Error),
}

/// Executor signs payloads, posts them and retries while upstream throttles.
///
/// One `execute` call runs its attempts sequentially; concurrent calls on a
/// shared executor only share the cache store.
#[derive(Debug, Clone)]
pub struct Executor {
    ctx: Context,
    config: Config,
    host: String,
    url: http::Uri,
    signer: Signer<Credential>,
    cache: Option<(ResponseCache, Duration)>,
    observer: Arc<dyn Observe>,
}

impl Executor {
    /// Create an executor, failing fast when `config` is incomplete.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        config.validate()?;

        let (Some(access_key), Some(secret_key), Some(host), Some(region)) = (
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            config.host.as_deref(),
            config.region.as_deref(),
        ) else {
            return Err(Error::config_invalid(
                "access_key, secret_key, host and region are required",
            ));
        };

        let url: http::Uri = format!("https://{host}{}", config.uri_path).parse()?;
        let signer = Signer::new(
            ctx.clone(),
            StaticCredentialProvider::new(access_key, secret_key),
            RequestSigner::new(&config.service, region),
        );
        let cache = config
            .cache_ttl
            .map(|ttl| (ResponseCache::new(ctx.clone()), ttl));

        Ok(Self {
            host: host.to_string(),
            url,
            signer,
            cache,
            observer: Arc::new(LogObserver),
            ctx,
            config,
        })
    }

    /// Replace the observer, [`LogObserver`] by default.
    pub fn with_observer(mut self, observer: impl Observe) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// The validated config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute `payload` and return the decoded upstream body.
    ///
    /// `Err` is reserved for failures on our side: an empty or non-object
    /// payload, a signing failure or a sleeper that cannot sleep. Everything
    /// upstream does is reported through [`RetryOutcome`].
    pub async fn execute(&self, payload: Value) -> Result<RetryOutcome<Response>> {
        let prepared = PreparedPayload::new(payload, &self.config)?;
        let fingerprint = prepared.fingerprint.as_str();

        if let Some(Value::Object(mut body)) = self.cache_get(fingerprint).await {
            self.observer.observe(&Event::CacheHit { fingerprint });
            body.insert(CACHE_MATCHED.to_string(), Value::from(1));
            return Ok(RetryOutcome::Success(Response { body, cached: true }));
        }

        let outcome = match self.exchange(&prepared.body).await? {
            Exchange::Answered(body, None) => {
                self.cache_put(fingerprint, Value::Object(body.clone()))
                    .await;
                RetryOutcome::Success(Response {
                    body,
                    cached: false,
                })
            }
            Exchange::Answered(_, Some(err)) => {
                warn!("request rejected by upstream: {err}");
                RetryOutcome::Rejected(err)
            }
            Exchange::Throttled(attempts) => RetryOutcome::Throttled { attempts },
            Exchange::Failed(err) => RetryOutcome::TransportFailed(err),
        };
        Ok(outcome)
    }

    /// Execute a multi-item `payload` and reshape the items by ASIN.
    ///
    /// Unlike [`Executor::execute`], `InvalidParameterValue` and
    /// `ItemNotAccessible` end the call successfully with whatever items the
    /// body carried, and the upstream `Errors` kept in the response.
    pub async fn execute_batch(&self, payload: Value) -> Result<RetryOutcome<BatchResponse>> {
        let prepared = PreparedPayload::new(payload, &self.config)?;
        let fingerprint = prepared.batch_fingerprint();
        let fingerprint = fingerprint.as_str();

        if let Some(value) = self.cache_get(fingerprint).await {
            match serde_json::from_value::<BatchResponse>(value) {
                Ok(mut resp) => {
                    self.observer.observe(&Event::CacheHit { fingerprint });
                    resp.cached = true;
                    return Ok(RetryOutcome::Success(resp));
                }
                Err(err) => warn!("cached batch response {fingerprint} is malformed, ignored: {err}"),
            }
        }

        let body = match self.exchange(&prepared.body).await? {
            Exchange::Answered(body, None) => body,
            Exchange::Answered(body, Some(err)) if err.is_item_error() => {
                warn!("batch stopped early on item error: {err}");
                body
            }
            Exchange::Answered(_, Some(err)) => {
                warn!("request rejected by upstream: {err}");
                return Ok(RetryOutcome::Rejected(err));
            }
            Exchange::Throttled(attempts) => return Ok(RetryOutcome::Throttled { attempts }),
            Exchange::Failed(err) => return Ok(RetryOutcome::TransportFailed(err)),
        };

        let resp = BatchResponse::from_body(&body);
        match serde_json::to_value(&resp) {
            Ok(value) => self.cache_put(fingerprint, value).await,
            Err(err) => warn!("failed to encode batch response {fingerprint}: {err}"),
        }
        Ok(RetryOutcome::Success(resp))
    }

    /// Send `body` until upstream stops throttling or attempts run out.
    async fn exchange(&self, body: &Bytes) -> Result<Exchange> {
        let max_attempts = self.config.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.observer.observe(&Event::Attempt {
                attempt,
                max_attempts,
            });

            let req = self.signed_request(body).await?;
            let resp = match self.ctx.http_send(req).await {
                Ok(resp) => resp,
                Err(err) => return Ok(Exchange::Failed(err)),
            };
            debug!("attempt {attempt} answered with status {}", resp.status());

            let answer = match decode(resp.body()) {
                Ok(answer) => answer,
                Err(err) => return Ok(Exchange::Failed(err)),
            };
            let err = match first_error(&answer) {
                Ok(None) => return Ok(Exchange::Answered(answer, None)),
                Ok(Some(err)) if err.is_throttle() => err,
                Ok(Some(err)) => return Ok(Exchange::Answered(answer, Some(err))),
                Err(err) => return Ok(Exchange::Failed(err)),
            };

            let delay = if attempt < max_attempts {
                self.config.attempt_delay
            } else {
                Duration::ZERO
            };
            self.observer.observe(&Event::Throttled {
                attempt,
                max_attempts,
                delay,
            });
            if attempt >= max_attempts {
                debug!("giving up after {attempt} throttled attempts: {err}");
                return Ok(Exchange::Throttled(attempt));
            }
            self.ctx.sleep(delay).await?;
        }
    }

    /// Build the POST for `body` and sign it at the current clock time.
    async fn signed_request(&self, body: &Bytes) -> Result<http::Request<Bytes>> {
        let (mut parts, ()) = http::Request::post(self.url.clone())
            .header(CONTENT_ENCODING, CONTENT_ENCODING_AMZ)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(HOST, self.host.as_str())
            .header(X_AMZ_TARGET, self.config.target.as_str())
            .body(())?
            .into_parts();
        self.signer.sign(&mut parts, body).await?;

        Ok(http::Request::from_parts(parts, body.clone()))
    }

    /// Read a live entry; a failing store counts as a miss.
    async fn cache_get(&self, fingerprint: &str) -> Option<Value> {
        let (cache, _) = self.cache.as_ref()?;
        match cache.get(fingerprint).await {
            Ok(value) => value,
            Err(err) => {
                warn!("failed to load cache entry {fingerprint}, treated as miss: {err}");
                None
            }
        }
    }

    /// Write an entry; a failing store is logged and otherwise ignored.
    async fn cache_put(&self, fingerprint: &str, value: Value) {
        let Some((cache, ttl)) = &self.cache else {
            return;
        };
        match cache.put(fingerprint, value, *ttl).await {
            Ok(()) => self.observer.observe(&Event::CacheStored { fingerprint }),
            Err(err) => warn!("failed to save cache entry {fingerprint}: {err}"),
        }
    }
}

/// Decode a response body that must be a JSON object.
fn decode(body: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(Error::response_invalid("response is not a JSON object")),
        Err(err) => {
            Err(Error::response_invalid("failed to decode response as JSON").with_source(err))
        }
    }
}

/// The first entry of `Errors`, if the body carries any.
fn first_error(body: &Map<String, Value>) -> Result<Option<ApiError>> {
    let errors = match body.get(ERRORS) {
        None | Some(Value::Null) => return Ok(None),
        Some(errors) => errors,
    };

    let first = errors
        .as_array()
        .and_then(|v| v.first())
        .ok_or_else(|| Error::response_invalid("Errors must be a non-empty array"))?;
    serde_json::from_value(first.clone())
        .map(Some)
        .map_err(|err| Error::response_invalid("malformed entry in Errors").with_source(err))
}
