use super::{expected_authorization, init_signer, paapi_request, HOST};
use http::header;
use pasign_core::Result;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_sign_search_items() -> Result<()> {
    let signer = init_signer();
    let body = r#"{"Keywords":"widget","Marketplace":"www.amazon.com","PartnerTag":"tag-20","PartnerType":"Associates"}"#;
    let (mut parts, bs) = paapi_request(body);

    signer.sign(&mut parts, &bs).await?;

    assert_eq!(parts.headers[header::HOST], HOST);
    assert_eq!(parts.headers["x-amz-date"], "20240309T080706Z");
    assert_eq!(
        parts.headers[header::AUTHORIZATION].to_str().unwrap(),
        expected_authorization(body)
    );
    Ok(())
}

#[tokio::test]
async fn test_sign_twice_yields_same_authorization() -> Result<()> {
    let signer = init_signer();

    let (mut first, bs) = paapi_request("{}");
    signer.sign(&mut first, &bs).await?;
    let (mut second, bs) = paapi_request("{}");
    signer.sign(&mut second, &bs).await?;

    assert_eq!(
        first.headers[header::AUTHORIZATION],
        second.headers[header::AUTHORIZATION]
    );
    Ok(())
}

#[tokio::test]
async fn test_sign_empty_body() -> Result<()> {
    let signer = init_signer();
    let (mut parts, bs) = paapi_request("");

    signer.sign(&mut parts, &bs).await?;

    assert_eq!(
        parts.headers[header::AUTHORIZATION].to_str().unwrap(),
        expected_authorization("")
    );
    Ok(())
}
