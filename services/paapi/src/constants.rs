// Env values used by Product Advertising API.
pub const PAAPI_ACCESS_KEY: &str = "PAAPI_ACCESS_KEY";
pub const PAAPI_SECRET_KEY: &str = "PAAPI_SECRET_KEY";
pub const PAAPI_PARTNER_TAG: &str = "PAAPI_PARTNER_TAG";
pub const PAAPI_PARTNER_TYPE: &str = "PAAPI_PARTNER_TYPE";
pub const PAAPI_MARKETPLACE: &str = "PAAPI_MARKETPLACE";
pub const PAAPI_HOST: &str = "PAAPI_HOST";
pub const PAAPI_REGION: &str = "PAAPI_REGION";

// Defaults.
pub const DEFAULT_PARTNER_TYPE: &str = "Associates";
pub const DEFAULT_SERVICE: &str = "ProductAdvertisingAPI";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_ATTEMPT_DELAY_SECS: u64 = 1;

// Headers fixed for every request.
pub const CONTENT_ENCODING_AMZ: &str = "amz-1.0";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

// Keys injected into every payload.
pub const PARTNER_TAG: &str = "PartnerTag";
pub const PARTNER_TYPE: &str = "PartnerType";
pub const MARKETPLACE: &str = "Marketplace";

// Response fields.
pub const ERRORS: &str = "Errors";
pub const CACHE_MATCHED: &str = "_cache_matched";

// Upstream error codes.
pub const TOO_MANY_REQUESTS: &str = "TooManyRequests";
pub const NO_RESULTS: &str = "NoResults";
pub const INVALID_PARAMETER_VALUE: &str = "InvalidParameterValue";
pub const ITEM_NOT_ACCESSIBLE: &str = "ItemNotAccessible";
