//! HTTP-level tests for the vetting API (stub upstreams, in-process router)

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use token_vetter::api::{create_router, AppState, RateLimitConfig, RateLimiter};
use token_vetter::VettingPipeline;
use tower::ServiceExt;

fn app(pipeline: VettingPipeline) -> Router {
    create_router(Arc::new(AppState::new(pipeline)))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================
// Scan
// ============================================

#[tokio::test]
async fn test_scan_eligible_token() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let (status, body) = post(app(pipeline), "/v1/vet/scan", json!({ "contractAddress": GOOD_MINT })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["eligible"], true);
    assert_eq!(data["tier"], "Stellar");
    assert_eq!(data["risk_level"], "Low Risk");
    assert_eq!(data["contract_address"], GOOD_MINT);
    assert_eq!(data["metadata"]["symbol"], "GOOD");
    assert_eq!(data["metadata"]["lp_burned"], true);
    assert_eq!(data["score_breakdown"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_scan_too_young_is_rejected_with_data() {
    let (pipeline, _) = stub_pipeline(TokenProfile::aged(10));
    let (status, body) = post(app(pipeline), "/v1/vet/scan", json!({ "contractAddress": YOUNG_MINT })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PROJECT_TOO_YOUNG");
    let data = &body["data"];
    assert_eq!(data["eligible"], false);
    assert_eq!(data["age_display"], "10 days");
    assert_eq!(data["minimum_age_required"], 14);
    assert!(data["tier"].is_null());
}

#[tokio::test]
async fn test_scan_invalid_address_makes_no_calls() {
    let (pipeline, calls) = stub_pipeline(TokenProfile::healthy());
    let (status, body) = post(app(pipeline), "/v1/vet/scan", json!({ "contractAddress": "0xdeadbeef" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ADDRESS_FORMAT");
    assert!(body.get("data").is_none());
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_scan_all_sources_down_is_503() {
    let pipeline = pipeline_with(dead_sources(CallCounter::default()));
    let (status, body) = post(app(pipeline), "/v1/vet/scan", json!({ "contractAddress": GOOD_MINT })).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
}

// ============================================
// Batch
// ============================================

#[tokio::test]
async fn test_batch_too_large() {
    let (pipeline, calls) = stub_pipeline(TokenProfile::healthy());
    let addresses: Vec<&str> = (0..21).map(|_| GOOD_MINT).collect();
    let (status, body) = post(app(pipeline), "/v1/vet/batch", json!({ "contractAddresses": addresses })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BATCH_TOO_LARGE");
    assert_eq!(
        body["error"]["message"],
        "Maximum 20 contract addresses allowed per batch request"
    );
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_batch_with_malformed_entry() {
    let (pipeline, calls) = stub_pipeline(TokenProfile::healthy());
    let (status, body) = post(
        app(pipeline),
        "/v1/vet/batch",
        json!({ "contractAddresses": [GOOD_MINT, "bad-address", YOUNG_MINT] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BATCH_ADDRESSES");
    assert_eq!(body["error"]["details"]["invalid_indices"], json!([1]));
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_batch_success() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let (status, body) = post(
        app(pipeline),
        "/v1/vet/batch",
        json!({ "contractAddresses": [GOOD_MINT, YOUNG_MINT] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_requested"], 2);
    assert_eq!(data["results"].as_array().unwrap().len(), 2);
    assert_eq!(data["results"][1]["contract_address"], YOUNG_MINT);
    assert_eq!(data["stats"]["eligible"], 2);
    assert_eq!(data["tiers"][0]["tier"], "Stellar");
}

// ============================================
// Read-only endpoints
// ============================================

#[tokio::test]
async fn test_tiers_endpoint() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let (status, body) = get(app(pipeline), "/v1/tiers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["min_project_age_days"], 14);
    let names: Vec<&str> = body["data"]["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Seed", "Sprout", "Bloom", "Stellar"]);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let router = app(pipeline);

    for uri in ["/health", "/v1/health"] {
        let (status, body) = get(router.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
    }
}

#[tokio::test]
async fn test_stats_count_scans() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let router = app(pipeline);

    post(router.clone(), "/v1/vet/scan", json!({ "contractAddress": GOOD_MINT })).await;
    post(router.clone(), "/v1/vet/scan", json!({ "contractAddress": "nope" })).await;

    let (status, body) = get(router, "/v1/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_scans"], 1);
    assert_eq!(body["data"]["eligible"], 1);
    assert_eq!(body["data"]["invalid_requests"], 1);
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let (pipeline, _) = stub_pipeline(TokenProfile::healthy());
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        requests_per_window: 2,
        window_duration: std::time::Duration::from_secs(60),
    }));
    let router = create_router(Arc::new(AppState::with_rate_limiter(pipeline, limiter)));

    for _ in 0..2 {
        let (status, _) = get(router.clone(), "/v1/tiers").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = get(router.clone(), "/v1/tiers").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "API_RATE_LIMITED");

    // Health stays reachable
    let (status, _) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
