//! Integration tests for `WikipediaClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use trendlens_sources::{SourceClient, SourceError, WikipediaClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> WikipediaClient {
    WikipediaClient::with_base_url(
        "en.wikipedia",
        "all-access",
        "user",
        "trendlens-test/0.1",
        30,
        base_url,
    )
    .expect("client construction should not fail")
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn item(timestamp: &str, views: u64) -> serde_json::Value {
    serde_json::json!({
        "project": "en.wikipedia",
        "article": "Rust_(programming_language)",
        "granularity": "daily",
        "timestamp": timestamp,
        "access": "all-access",
        "agent": "user",
        "views": views
    })
}

#[tokio::test]
async fn maps_daily_pageviews_into_buckets() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [ item("2024112000", 120), item("2024112200", 80) ]
    });

    Mock::given(method("GET"))
        .and(path(
            "/metrics/pageviews/per-article/en.wikipedia/all-access/user/rust/daily/2024112000/2024112200",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let series = client
        .fetch_daily("rust", d("2024-11-20"), d("2024-11-22"))
        .await
        .expect("should parse pageviews");

    let buckets = series.buckets();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0].count, 120);
    assert_eq!(buckets[1].count, 0, "day missing upstream is a zero bucket");
    assert_eq!(buckets[2].count, 80);
    assert_eq!(series.total(), 200);
}

#[tokio::test]
async fn topic_is_normalized_into_the_article_path() {
    let server = MockServer::start().await;

    let body = serde_json::json!({ "items": [ item("2024112000", 5) ] });

    Mock::given(method("GET"))
        .and(path(
            "/metrics/pageviews/per-article/en.wikipedia/all-access/user/rust_lang/daily/2024112000/2024112000",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let series = client
        .fetch_daily("  rust lang ", d("2024-11-20"), d("2024-11-20"))
        .await
        .expect("whitespace should collapse to underscores");

    assert_eq!(series.total(), 5);
}

#[tokio::test]
async fn unknown_article_yields_zero_series() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found",
            "title": "Not found."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let series = client
        .fetch_daily("no such page", d("2024-11-20"), d("2024-11-22"))
        .await
        .expect("404 is meaningful data, not a failure");

    assert_eq!(series.buckets().len(), 3);
    assert_eq!(series.total(), 0);
}

#[tokio::test]
async fn server_error_is_source_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("throttled"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_daily("rust", d("2024-11-20"), d("2024-11-22"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, SourceError::Status { status, .. } if status.as_u16() == 503),
        "expected Status error, got: {err}"
    );
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_daily("rust", d("2024-11-20"), d("2024-11-22"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, SourceError::Deserialize { .. }),
        "expected Deserialize error, got: {err}"
    );
}
