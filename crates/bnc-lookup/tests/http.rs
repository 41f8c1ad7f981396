mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::util::ServiceExt;

use bnc_lookup::handlers::router;

async fn get(disable_cache: bool, uri: &str) -> Response {
    let (_dir, state) = common::make_state(disable_cache);
    router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json(response: Response) -> serde_json::Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let response = get(false, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lookup_reports_direct_hit() {
    let response = get(false, "/v1/lookup?word=The").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::CACHE_CONTROL));
    let body = json(response).await;
    assert_eq!(body["word"], "The");
    assert_eq!(body["normalized"], "the");
    assert_eq!(body["exists"], true);
    assert_eq!(body["bucket"], 1);
    assert_eq!(body["bucket_via"], "direct");
    assert_eq!(body["relative_frequency"], 0.0617);
    assert!(body["expected_count"].is_null());
}

#[tokio::test]
async fn lookup_reports_fallback_tiers() {
    let body = json(get(false, "/v1/lookup?word=don%E2%80%99t").await).await;
    assert_eq!(body["normalized"], "don't");
    assert_eq!(body["bucket"], 1);
    assert_eq!(body["bucket_via"], "contraction");
    assert_eq!(body["relative_frequency"], 0.00274);
    assert_eq!(body["frequency_via"], "contraction");

    let body = json(get(false, "/v1/lookup?word=computers").await).await;
    assert_eq!(body["exists"], true);
    assert_eq!(body["bucket"], 3);
    assert_eq!(body["bucket_via"], "plural");
}

#[tokio::test]
async fn lookup_expected_counts() {
    let body = json(get(false, "/v1/lookup?word=the&length=50000&rounded=true").await).await;
    assert_eq!(body["expected_count"], 3085);

    let body = json(get(false, "/v1/lookup?word=shimmered&length=50000").await).await;
    let count = body["expected_count"].as_f64().unwrap();
    assert!(count > 0.0 && count < 1.0);
}

#[tokio::test]
async fn lookup_unknown_word_is_null_not_error() {
    let response = get(false, "/v1/lookup?word=xyzabc123&length=1000").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["exists"], false);
    assert!(body["bucket"].is_null());
    assert!(body["bucket_via"].is_null());
    assert!(body["relative_frequency"].is_null());
    assert!(body["expected_count"].is_null());
}

#[tokio::test]
async fn lookup_requires_word() {
    for uri in ["/v1/lookup", "/v1/lookup?word=", "/v1/lookup?word=%20%20"] {
        let response = get(false, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = json(response).await;
        assert!(body["error"].as_str().unwrap_or_default().contains("word"));
    }
}

#[tokio::test]
async fn bucket_words_paginate() {
    let body = json(get(false, "/v1/buckets/1?page=1&page_size=3").await).await;
    assert_eq!(body["bucket"], 1);
    assert_eq!(body["total"], 10);
    assert_eq!(body["page_size"], 3);
    assert_eq!(body["has_more"], true);
    let items: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(items, vec!["'ll", "'s", "and"]);

    let body = json(get(false, "/v1/buckets/1?page=4&page_size=3").await).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn bucket_page_size_is_clamped() {
    let body = json(get(false, "/v1/buckets/1?page_size=100").await).await;
    assert_eq!(body["page_size"], 5);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn bucket_words_reject_invalid_params() {
    for uri in [
        "/v1/buckets/0",
        "/v1/buckets/101",
        "/v1/buckets/-3",
        "/v1/buckets/1?page=0",
        "/v1/buckets/1?page_size=0",
    ] {
        let response = get(false, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    let body = json(get(false, "/v1/buckets/101").await).await;
    assert_eq!(body["error"], "bucket must be 1-100, got 101");
}

#[tokio::test]
async fn non_numeric_bucket_is_a_json_error() {
    for uri in ["/v1/buckets/abc", "/v1/buckets/1.5", "/v1/buckets/abc/sample"] {
        let response = get(false, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = json(response).await;
        assert_eq!(body["error"], "bucket must be an integer", "{uri}");
    }
}

#[tokio::test]
async fn empty_bucket_is_not_an_error() {
    let body = json(get(false, "/v1/buckets/50").await).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn sample_is_never_cached() {
    let response = get(false, "/v1/buckets/1/sample?n=4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::CACHE_CONTROL));
    let body = json(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn sample_defaults_and_clamps() {
    // Bucket 62 holds a single word.
    let body = json(get(false, "/v1/buckets/62/sample").await).await;
    assert_eq!(body["items"], serde_json::json!(["python"]));

    // Default of ten is clamped to the configured maximum of five.
    let body = json(get(false, "/v1/buckets/1/sample").await).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 5);

    let response = get(false, "/v1/buckets/0/sample").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn no_cache_omits_headers() {
    let response = get(true, "/v1/lookup?word=the").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::CACHE_CONTROL));
    let response = get(true, "/v1/buckets/1").await;
    assert!(!response.headers().contains_key(header::CACHE_CONTROL));
}
