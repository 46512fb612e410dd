use axum::http::{header, Method, StatusCode};
use serial_test::serial;

use crate::common::{series_value, TestContext};

#[serial]
#[tokio::test]
async fn root_request_is_counted_on_next_scrape() {
    let ctx = TestContext::new();

    ctx.server.get("/").await.assert_status_ok();
    let output = ctx.scrape().await;

    assert!(output
        .lines()
        .any(|line| line == "http_requests_total{method=\"GET\",route=\"/\",status=\"200\"} 1"));
}

#[serial]
#[tokio::test]
async fn repeated_health_checks_accumulate() {
    let ctx = TestContext::new();

    for _ in 0..3 {
        ctx.server.get("/health").await.assert_status_ok();
    }
    let output = ctx.scrape().await;

    assert_eq!(
        series_value(
            &output,
            "http_requests_total{method=\"GET\",route=\"/health\",status=\"200\"}"
        ),
        Some(3.0)
    );
}

#[serial]
#[tokio::test]
async fn scrape_requests_are_observed_after_they_finish() {
    let ctx = TestContext::new();

    let first = ctx.scrape().await;
    assert!(!first.contains("route=\"/metrics\""));

    let second = ctx.scrape().await;
    assert_eq!(
        series_value(
            &second,
            "http_requests_total{method=\"GET\",route=\"/metrics\",status=\"200\"}"
        ),
        Some(1.0)
    );
}

#[serial]
#[tokio::test]
async fn metrics_endpoint_uses_text_exposition_format() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/metrics").await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "text/plain; version=0.0.4"
    );
    assert!(response.text().contains("process_uptime_seconds"));
}

#[serial]
#[tokio::test]
async fn unmatched_path_is_labelled_with_raw_path() {
    let ctx = TestContext::new();

    ctx.server
        .get("/missing")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let output = ctx.scrape().await;

    assert_eq!(
        series_value(
            &output,
            "http_requests_total{method=\"GET\",route=\"/missing\",status=\"404\"}"
        ),
        Some(1.0)
    );
}

#[serial]
#[tokio::test]
async fn method_label_follows_request_verb() {
    let ctx = TestContext::new();

    ctx.server
        .post("/health")
        .expect_failure()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let output = ctx.scrape().await;

    assert_eq!(
        series_value(
            &output,
            "http_requests_total{method=\"POST\",route=\"/health\",status=\"405\"}"
        ),
        Some(1.0)
    );
}

#[serial]
#[tokio::test]
async fn head_requests_are_counted() {
    let ctx = TestContext::new();

    ctx.server
        .method(Method::HEAD, "/health")
        .await
        .assert_status_ok();
    let output = ctx.scrape().await;

    assert_eq!(
        series_value(
            &output,
            "http_requests_total{method=\"HEAD\",route=\"/health\",status=\"200\"}"
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn root_describes_service() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["service"], "stack-sample");
    assert_eq!(body["status"], "running");
    assert_eq!(body["health"], "/health");
    assert_eq!(body["metrics"], "/metrics");
}

#[tokio::test]
async fn health_endpoints_report_ok() {
    let ctx = TestContext::new();

    let json = ctx.server.get("/health").await;
    json.assert_status_ok();
    let body: serde_json::Value = json.json();
    assert_eq!(body["status"], "ok");

    let plain = ctx.server.get("/healthz").await;
    plain.assert_status_ok();
    plain.assert_text("ok");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    assert_eq!(response.header(header::X_CONTENT_TYPE_OPTIONS), "nosniff");
    assert_eq!(response.header(header::REFERRER_POLICY), "no-referrer");
}
