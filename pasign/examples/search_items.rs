use anyhow::Result;
use pasign::paapi::{default_cached_executor, Config, Operation, RetryOutcome};
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Credentials, partner tag, marketplace, host and region come from PAAPI_* env.
    let config = Config::default().with_operation(Operation::SearchItems);
    let executor = default_cached_executor(
        config,
        std::env::temp_dir().join("pasign-cache"),
        Duration::from_secs(1800),
    )?;

    let keywords = std::env::args().nth(1).unwrap_or_else(|| "rust".to_string());
    let outcome = executor
        .execute(json!({
            "Keywords": keywords,
            "Resources": ["ItemInfo.Title", "Offers.Listings.Price"],
        }))
        .await?;

    match outcome {
        RetryOutcome::Success(resp) => {
            println!("cached: {}", resp.cached);
            println!("{}", serde_json::to_string_pretty(&resp.body)?);
        }
        RetryOutcome::Rejected(err) if err.is_no_results() => println!("no results"),
        other => {
            other.into_result()?;
        }
    }

    Ok(())
}
