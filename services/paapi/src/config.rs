use crate::constants::*;
use pasign_core::utils::Redact;
use pasign_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Operations exposed by Product Advertising API 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Search items by keywords, browse node or other criteria.
    SearchItems,
    /// Look up items by ASIN.
    GetItems,
    /// Look up the variations of an item.
    GetVariations,
    /// Look up browse nodes by id.
    GetBrowseNodes,
}

impl Operation {
    /// The operation name as used in `x-amz-target`.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SearchItems => "SearchItems",
            Operation::GetItems => "GetItems",
            Operation::GetVariations => "GetVariations",
            Operation::GetBrowseNodes => "GetBrowseNodes",
        }
    }

    /// URI path the operation is posted to.
    pub fn path(&self) -> &'static str {
        match self {
            Operation::SearchItems => "/paapi5/searchitems",
            Operation::GetItems => "/paapi5/getitems",
            Operation::GetVariations => "/paapi5/getvariations",
            Operation::GetBrowseNodes => "/paapi5/getbrowsenodes",
        }
    }

    /// Value of the `x-amz-target` header.
    pub fn target(&self) -> String {
        format!(
            "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.{}",
            self.name()
        )
    }
}

/// Config carries all the configuration for Product Advertising API requests.
#[derive(Clone)]
pub struct Config {
    /// `access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_ACCESS_KEY`]
    pub access_key: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_SECRET_KEY`]
    pub secret_key: Option<String>,
    /// `partner_tag` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_PARTNER_TAG`]
    pub partner_tag: Option<String>,
    /// `partner_type` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_PARTNER_TYPE`]
    /// - default to `Associates`
    pub partner_type: Option<String>,
    /// `marketplace` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_MARKETPLACE`]
    pub marketplace: Option<String>,
    /// `host` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_HOST`]
    pub host: Option<String>,
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PAAPI_REGION`]
    pub region: Option<String>,
    /// Service name in the credential scope, default to `ProductAdvertisingAPI`.
    pub service: String,
    /// URI path requests are posted to, default to the SearchItems path.
    pub uri_path: String,
    /// Value of `x-amz-target`, default to the SearchItems target.
    pub target: String,
    /// Attempts made while upstream keeps throttling, default to 10.
    pub max_attempts: u32,
    /// Delay between throttled attempts, default to 1s.
    pub attempt_delay: Duration,
    /// How long successful responses are cached. `None` disables caching.
    pub cache_ttl: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            partner_tag: None,
            partner_type: None,
            marketplace: None,
            host: None,
            region: None,
            service: DEFAULT_SERVICE.to_string(),
            uri_path: Operation::SearchItems.path().to_string(),
            target: Operation::SearchItems.target(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_delay: Duration::from_secs(DEFAULT_ATTEMPT_DELAY_SECS),
            cache_ttl: None,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key", &self.access_key.as_ref().map(Redact::from))
            .field("secret_key", &self.secret_key.as_ref().map(Redact::from))
            .field("partner_tag", &self.partner_tag)
            .field("partner_type", &self.partner_type)
            .field("marketplace", &self.marketplace)
            .field("host", &self.host)
            .field("region", &self.region)
            .field("service", &self.service)
            .field("uri_path", &self.uri_path)
            .field("target", &self.target)
            .field("max_attempts", &self.max_attempts)
            .field("attempt_delay", &self.attempt_delay)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(PAAPI_ACCESS_KEY) {
            self.access_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(PAAPI_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(PAAPI_PARTNER_TAG) {
            self.partner_tag.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(PAAPI_PARTNER_TYPE) {
            self.partner_type.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(PAAPI_MARKETPLACE) {
            self.marketplace.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(PAAPI_HOST) {
            self.host.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(PAAPI_REGION) {
            self.region.get_or_insert(v);
        }

        self
    }

    /// Point the config at `op`.
    pub fn with_operation(mut self, op: Operation) -> Self {
        self.uri_path = op.path().to_string();
        self.target = op.target();
        self
    }

    /// The partner type injected into every payload.
    pub fn partner_type(&self) -> &str {
        self.partner_type.as_deref().unwrap_or(DEFAULT_PARTNER_TYPE)
    }

    /// Check that every required option is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("access_key", &self.access_key),
            ("secret_key", &self.secret_key),
            ("partner_tag", &self.partner_tag),
            ("marketplace", &self.marketplace),
            ("host", &self.host),
            ("region", &self.region),
        ];
        for (name, value) in required {
            if value.as_deref().map_or(true, str::is_empty) {
                return Err(Error::config_invalid(format!("{name} is required")));
            }
        }

        if self.service.is_empty() {
            return Err(Error::config_invalid("service is required"));
        }
        if self.target.is_empty() {
            return Err(Error::config_invalid("target is required"));
        }
        if !self.uri_path.starts_with('/') {
            return Err(Error::config_invalid(format!(
                "uri_path must start with '/', got {:?}",
                self.uri_path
            )));
        }
        if self.uri_path.contains('?') {
            return Err(Error::config_invalid("uri_path must not carry a query"));
        }
        if self.max_attempts == 0 {
            return Err(Error::config_invalid("max_attempts must be at least 1"));
        }

        Ok(())
    }
}
