use crate::constants::*;
use pasign_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The first entry of a response's `Errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Upstream error code, e.g. `NoResults`.
    #[serde(rename = "Code")]
    pub code: String,
    /// Human readable message.
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl ApiError {
    /// Whether upstream asked us to slow down.
    pub fn is_throttle(&self) -> bool {
        self.code == TOO_MANY_REQUESTS
    }

    /// Whether upstream refused one of the requested items rather than the
    /// whole request.
    pub fn is_item_error(&self) -> bool {
        self.code == INVALID_PARAMETER_VALUE || self.code == ITEM_NOT_ACCESSIBLE
    }

    /// Whether the request matched nothing.
    pub fn is_no_results(&self) -> bool {
        self.code == NO_RESULTS
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result of executing one logical request.
///
/// Only `Success` carries a response. Every other variant is a final,
/// observable failure.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// Upstream answered without errors, or the answer came from the cache.
    Success(T),
    /// Upstream was still throttling when the attempt budget ran out.
    Throttled {
        /// Attempts made, equal to the configured maximum.
        attempts: u32,
    },
    /// Upstream rejected the request or its target; retrying will not help.
    Rejected(ApiError),
    /// The request failed on the way, or the response was not a JSON object.
    TransportFailed(Error),
}

impl<T> RetryOutcome<T> {
    /// Returns true if the outcome is `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Success(_))
    }

    /// Convert into a `Result`, mapping every failure to an [`Error`] of the
    /// matching kind.
    pub fn into_result(self) -> pasign_core::Result<T> {
        match self {
            RetryOutcome::Success(v) => Ok(v),
            RetryOutcome::Throttled { attempts } => Err(Error::throttled(format!(
                "{TOO_MANY_REQUESTS}: still throttled after {attempts} attempts"
            ))),
            RetryOutcome::Rejected(err) => Err(Error::rejected(err.to_string())),
            RetryOutcome::TransportFailed(err) => Err(err),
        }
    }
}

/// A successful single response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The decoded upstream body. Carries `"_cache_matched": 1` when served
    /// from the cache.
    pub body: Map<String, Value>,
    /// Whether the body came from the cache.
    pub cached: bool,
}

/// A successful batch response, items keyed by ASIN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// ASINs in the order upstream returned them.
    #[serde(rename = "result_ASINs")]
    pub result_asins: Vec<String>,
    /// Item records keyed by ASIN.
    #[serde(rename = "ASINs")]
    pub asins: Map<String, Value>,
    /// Upstream errors, present when the batch stopped early on an item error.
    #[serde(rename = "Errors", default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    /// Whether the response came from the cache.
    #[serde(skip)]
    pub cached: bool,
}

impl BatchResponse {
    /// Reshape an upstream body into a batch response.
    ///
    /// Items without a string `ASIN` are skipped. A missing `ItemsResult`
    /// yields an empty response.
    pub fn from_body(body: &Map<String, Value>) -> Self {
        let mut out = BatchResponse {
            errors: body.get(ERRORS).and_then(Value::as_array).cloned(),
            ..Default::default()
        };

        let items = body
            .get("ItemsResult")
            .and_then(|v| v.get("Items"))
            .and_then(Value::as_array);
        for item in items.into_iter().flatten() {
            let Some(asin) = item.get("ASIN").and_then(Value::as_str) else {
                continue;
            };
            if !out.asins.contains_key(asin) {
                out.result_asins.push(asin.to_string());
            }
            out.asins.insert(asin.to_string(), item.clone());
        }

        out
    }
}
