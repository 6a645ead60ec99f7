use crate::constants::{MARKETPLACE, PARTNER_TAG, PARTNER_TYPE};
use crate::Config;
use bytes::Bytes;
use pasign_core::hash::hex_sha1;
use pasign_core::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A payload ready to be sent: the canonical body and its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPayload {
    /// Compact JSON with object keys sorted at every level.
    pub body: Bytes,
    /// Lowercase hex SHA-1 of `body`.
    pub fingerprint: String,
}

impl PreparedPayload {
    /// Inject the partner fields from `config` into `payload` and canonicalise it.
    ///
    /// `payload` must be a non-empty JSON object. `PartnerTag`, `PartnerType`
    /// and `Marketplace` always take the configured values, whatever the
    /// caller put there.
    pub fn new(payload: Value, config: &Config) -> Result<Self> {
        let mut object = match payload {
            Value::Object(object) if !object.is_empty() => object,
            Value::Object(_) => return Err(Error::request_invalid("payload must not be empty")),
            other => {
                return Err(Error::request_invalid(format!(
                    "payload must be a JSON object, got {}",
                    type_name(&other)
                )))
            }
        };

        inject(&mut object, PARTNER_TAG, config.partner_tag.as_deref());
        inject(&mut object, PARTNER_TYPE, Some(config.partner_type()));
        inject(&mut object, MARKETPLACE, config.marketplace.as_deref());

        let body = canonical_json(&Value::Object(object))?;
        let fingerprint = hex_sha1(&body);
        Ok(Self {
            body: Bytes::from(body),
            fingerprint,
        })
    }

    /// Fingerprint used for batch responses.
    ///
    /// Batch results are stored reshaped, so they live under a key distinct
    /// from the single response of the same body.
    pub fn batch_fingerprint(&self) -> String {
        hex_sha1(&[b"batch\n".as_slice(), &self.body[..]].concat())
    }
}

fn inject(object: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        object.insert(key.to_string(), Value::String(v.to_string()));
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serialize `value` as compact JSON with object keys in ascending byte order.
///
/// The output does not depend on the insertion order of any map, so equal
/// payloads always hash to the same fingerprint.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(&Canonical(value)).map_err(Error::from)
}

struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(object) => {
                let mut entries: Vec<_> = object.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                let mut map = s.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, &Canonical(v))?;
                }
                map.end()
            }
            Value::Array(items) => s.collect_seq(items.iter().map(Canonical)),
            other => other.serialize(s),
        }
    }
}
