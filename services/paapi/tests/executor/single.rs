use super::*;
use pasign_core::ErrorKind;
use pasign_paapi::{Operation, RetryOutcome};
use pretty_assertions::assert_eq;

const EXPECTED_BODY: &str = r#"{"Keywords":"widget","Marketplace":"www.example.com","PartnerTag":"tag-1","PartnerType":"Associates"}"#;

#[tokio::test]
async fn test_search_items_end_to_end() -> Result<()> {
    let harness = Harness::new([Reply::Json(json!({
        "SearchResult": {"Items": [{"ASIN": "B000000001"}], "TotalResultCount": 1},
    }))]);
    let executor = harness.executor(harness.config());

    let resp = executor
        .execute(json!({"Keywords": "widget"}))
        .await?
        .into_result()?;
    assert!(!resp.cached);
    assert_eq!(resp.body["SearchResult"]["TotalResultCount"], 1);

    let requests = harness.http.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method(), http::Method::POST);
    assert_eq!(
        req.uri().to_string(),
        "https://webservices.example.com/paapi5/searchitems"
    );
    assert_eq!(std::str::from_utf8(req.body()).unwrap(), EXPECTED_BODY);

    let headers = req.headers();
    assert_eq!(headers["content-encoding"], "amz-1.0");
    assert_eq!(headers["content-type"], "application/json; charset=utf-8");
    assert_eq!(headers["host"], HOST);
    assert_eq!(headers["x-amz-date"], "20240309T080706Z");
    assert_eq!(
        headers["x-amz-target"],
        "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems"
    );
    assert_eq!(
        headers["authorization"].to_str().unwrap(),
        expected_authorization(
            start_time(),
            "/paapi5/searchitems",
            "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems",
            EXPECTED_BODY.as_bytes(),
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_headers_go_out_in_signed_order() -> Result<()> {
    let harness = Harness::new([Reply::Json(json!({"SearchResult": {}}))]);
    let executor = harness.executor(harness.config());

    executor
        .execute(json!({"Keywords": "widget"}))
        .await?
        .into_result()?;

    let requests = harness.http.requests();
    let names: Vec<&str> = requests[0].headers().keys().map(|k| k.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "content-encoding",
            "content-type",
            "host",
            "x-amz-date",
            "x-amz-target",
            "authorization",
        ]
    );
    assert!(requests[0].headers()["authorization"].is_sensitive());
    Ok(())
}

#[tokio::test]
async fn test_caller_cannot_override_partner_fields() -> Result<()> {
    let harness = Harness::new([Reply::Json(json!({"SearchResult": {}}))]);
    let executor = harness.executor(harness.config());

    executor
        .execute(json!({
            "Keywords": "widget",
            "PartnerTag": "someone-else",
            "Marketplace": "www.elsewhere.com",
        }))
        .await?
        .into_result()?;

    let requests = harness.http.requests();
    assert_eq!(std::str::from_utf8(requests[0].body()).unwrap(), EXPECTED_BODY);
    Ok(())
}

#[tokio::test]
async fn test_always_throttled_exhausts_attempts() -> Result<()> {
    let harness = Harness::new([Reply::Json(throttle())]);
    let config = Config {
        max_attempts: 4,
        ..harness.config()
    };
    let executor = harness.executor(config);

    let outcome = executor.execute(json!({"Keywords": "widget"})).await?;
    assert!(matches!(outcome, RetryOutcome::Throttled { attempts: 4 }));
    assert_eq!(harness.http.count(), 4);
    assert_eq!(harness.sleep.sleeps(), vec![Duration::from_secs(2); 3]);
    assert_eq!(harness.observer.count("Attempt"), 4);
    assert_eq!(harness.observer.count("Throttled"), 4);
    assert_eq!(harness.observer.count("CacheStored"), 0);

    let err = outcome.into_result().expect_err("throttled must be an error");
    assert_eq!(err.kind(), ErrorKind::Throttled);
    Ok(())
}

#[tokio::test]
async fn test_single_attempt_never_sleeps() -> Result<()> {
    let harness = Harness::new([Reply::Json(throttle())]);
    let config = Config {
        max_attempts: 1,
        ..harness.config()
    };
    let executor = harness.executor(config);

    let outcome = executor.execute(json!({"Keywords": "widget"})).await?;
    assert!(matches!(outcome, RetryOutcome::Throttled { attempts: 1 }));
    assert!(harness.sleep.sleeps().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_throttle_then_success_resigns_each_attempt() -> Result<()> {
    let harness = Harness::new([
        Reply::Json(throttle()),
        Reply::Json(throttle()),
        Reply::Json(json!({"SearchResult": {"TotalResultCount": 3}})),
    ]);
    let executor = harness.executor(harness.config());

    let resp = executor
        .execute(json!({"Keywords": "widget"}))
        .await?
        .into_result()?;
    assert_eq!(resp.body["SearchResult"]["TotalResultCount"], 3);
    assert_eq!(harness.sleep.sleeps().len(), 2);

    let dates: Vec<String> = harness
        .http
        .requests()
        .iter()
        .map(|r| r.headers()["x-amz-date"].to_str().unwrap().to_string())
        .collect();
    assert_eq!(
        dates,
        vec!["20240309T080706Z", "20240309T080708Z", "20240309T080710Z"]
    );
    Ok(())
}

#[tokio::test]
async fn test_no_results_is_rejected_immediately() -> Result<()> {
    let harness = Harness::new([Reply::Json(json!({
        "Errors": [{"Code": "NoResults", "Message": "No results found for your request."}],
    }))]);
    let executor = harness.executor(harness.config());

    let outcome = executor.execute(json!({"Keywords": "zzzz"})).await?;
    let err = match outcome {
        RetryOutcome::Rejected(err) => err,
        other => panic!("expected rejection, got {other:?}"),
    };
    assert_eq!(err.code, "NoResults");
    assert_eq!(err.message, "No results found for your request.");
    assert_eq!(harness.http.count(), 1);
    assert!(harness.sleep.sleeps().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_item_errors_and_unknown_codes_are_rejected() -> Result<()> {
    for code in ["InvalidParameterValue", "ItemNotAccessible", "AccessDenied"] {
        let harness = Harness::new([Reply::Json(json!({
            "Errors": [{"Code": code, "Message": "nope"}],
        }))]);
        let executor = harness.executor(harness.config());

        let outcome = executor.execute(json!({"Keywords": "widget"})).await?;
        assert!(
            matches!(&outcome, RetryOutcome::Rejected(err) if err.code == code),
            "{code} must be rejected, got {outcome:?}"
        );
        assert_eq!(harness.http.count(), 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_transport_and_decode_failures_are_not_retried() -> Result<()> {
    for reply in [Reply::Fail, Reply::Raw("<html>busy</html>")] {
        let harness = Harness::new([reply, Reply::Json(json!({"SearchResult": {}}))]);
        let executor = harness.executor(harness.config());

        let outcome = executor.execute(json!({"Keywords": "widget"})).await?;
        let err = match outcome {
            RetryOutcome::TransportFailed(err) => err,
            other => panic!("expected transport failure, got {other:?}"),
        };
        assert!(err.is_transport_error());
        assert_eq!(harness.http.count(), 1);
        assert!(harness.sleep.sleeps().is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_payload_fails_before_network() {
    let harness = Harness::new([Reply::Json(json!({}))]);
    let executor = harness.executor(harness.config());

    let err = executor
        .execute(json!({}))
        .await
        .expect_err("empty payload must fail");
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(harness.http.count(), 0);
}

#[tokio::test]
async fn test_get_items_operation() -> Result<()> {
    let harness = Harness::new([Reply::Json(json!({"ItemsResult": {"Items": []}}))]);
    let executor = harness.executor(harness.config().with_operation(Operation::GetItems));

    executor
        .execute(json!({"ItemIds": ["B000000001"]}))
        .await?
        .into_result()?;

    let requests = harness.http.requests();
    let req = &requests[0];
    assert_eq!(req.uri().path(), "/paapi5/getitems");
    assert_eq!(
        req.headers()["x-amz-target"],
        "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems"
    );
    assert_eq!(
        req.headers()["authorization"].to_str().unwrap(),
        expected_authorization(
            start_time(),
            "/paapi5/getitems",
            "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems",
            req.body(),
        )
    );
    Ok(())
}
