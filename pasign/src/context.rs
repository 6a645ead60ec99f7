use pasign_core::{Context, OsEnv};
use pasign_http_send_reqwest::ReqwestHttpSend;
use pasign_sleep_tokio::TokioSleep;

/// Create a context with reqwest transport, tokio sleeping and the OS
/// environment.
///
/// No cache store is configured; add one with
/// [`Context::with_cache_store`] to enable response caching.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_sleep(TokioSleep)
        .with_env(OsEnv)
}
