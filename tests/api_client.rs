//! End-to-end tests against a stub server. The transport is mocked with
//! wiremock; a pinned clock makes the signatures reproducible.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxcrawl_rs::{Credentials, Error, FixedClock, KeywordQuery, WxCrawlClient, WxCrawlConfig};

const TEST_TIMESTAMP: u64 = 1_700_000_000;

fn test_client(server: &MockServer) -> WxCrawlClient {
    let config = WxCrawlConfig::new(Credentials::new("ak-test", "sk-test")).base_url(server.uri());
    WxCrawlClient::with_config(config)
        .unwrap()
        .with_clock(Arc::new(FixedClock(TEST_TIMESTAMP)))
}

#[tokio::test]
async fn search_sends_signed_headers() {
    let server = MockServer::start().await;

    // md5("ak-test" + "/api/search" + "1700000000" + "sk-test")
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("search", "TuringTouch"))
        .and(header("x-api-key", "ak-test"))
        .and(header("x-timestamp", "1700000000"))
        .and(header("x-signature", "bdf1933dde133fa1c426b4a1294e6839"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": [{"name": "图触触控技术TuringTouch", "alias": "turing_touch"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = test_client(&server)
        .search_accounts("TuringTouch")
        .await
        .unwrap();

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "图触触控技术TuringTouch");
}

#[tokio::test]
async fn extract_signature_covers_the_extract_path() {
    let server = MockServer::start().await;

    // md5("ak-test" + "/api/extract" + "1700000000" + "sk-test")
    Mock::given(method("GET"))
        .and(path("/api/extract"))
        .and(query_param("url", "https://example.com/a"))
        .and(header("x-signature", "10a6252893ccfd12ae8a0ec36575ecc4"))
        .respond_with(ResponseTemplate::new(200).set_body_json("# 标题\n\n正文"))
        .expect(1)
        .mount(&server)
        .await;

    let markdown = test_client(&server)
        .extract_article("https://example.com/a")
        .await
        .unwrap();

    assert_eq!(markdown, "# 标题\n\n正文");
}

#[tokio::test]
async fn extract_accepts_enveloped_markdown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": "# Heading"
        })))
        .mount(&server)
        .await;

    let markdown = test_client(&server)
        .extract_article("https://mp.weixin.qq.com/s/abc")
        .await
        .unwrap();

    assert_eq!(markdown, "# Heading");
}

#[tokio::test]
async fn extract_falls_back_to_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Raw markdown, not JSON"))
        .mount(&server)
        .await;

    let markdown = test_client(&server)
        .extract_article("https://mp.weixin.qq.com/s/abc")
        .await
        .unwrap();

    assert_eq!(markdown, "# Raw markdown, not JSON");
}

#[tokio::test]
async fn keyword_search_sends_pagination_and_returns_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/keyword_search"))
        .and(query_param("keyword", "AI"))
        .and(query_param("nickname", "求知图图"))
        .and(query_param("search_type", "title"))
        .and(query_param("count", "5"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "total": 42,
            "data": [{"title": "AI 周报", "create_time": 1700000000}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = KeywordQuery::new("AI", "求知图图").count(5).offset(10);
    let result = test_client(&server).keyword_search(&query).await.unwrap();

    assert_eq!(result.total, Some(42));
    assert_eq!(result.articles.len(), 1);
    assert_eq!(result.articles[0].title.as_deref(), Some("AI 周报"));
}

#[tokio::test]
async fn non_2xx_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_accounts("anything")
        .await
        .unwrap_err();

    match err {
        Error::Status { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/latest_articles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .latest_articles("TuringTouch", 5)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn envelope_error_code_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/latest_articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 404,
            "message": "account not found"
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .latest_articles("no-such-account", 5)
        .await
        .unwrap_err();

    match err {
        Error::Api { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "account not found");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_parameters_never_reach_the_wire() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    assert!(matches!(
        client.latest_articles("TuringTouch", 0).await,
        Err(Error::InvalidRequest(_))
    ));
    assert!(matches!(
        client.search_accounts("   ").await,
        Err(Error::InvalidRequest(_))
    ));
    assert!(matches!(
        client.extract_article("").await,
        Err(Error::InvalidRequest(_))
    ));

    // No mocks mounted; any request would have failed the test with a 404
    // from wiremock. Nothing was received.
    assert!(server.received_requests().await.unwrap().is_empty());
}
