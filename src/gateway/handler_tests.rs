use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;
use crate::aggregator::{MockAggregator, RawCandidate};
use crate::cache::MemoryStore;
use crate::model::ModelManager;
use crate::pipeline::Enricher;
use crate::vision::ImageVerifier;

fn candidate() -> RawCandidate {
    RawCandidate {
        source: "upcdb".to_string(),
        url: Some("https://upcdb.example.com/item".to_string()),
        title: Some("DIBS Beauty Lip Liner".to_string()),
        description: Some("Long-wear lip liner".to_string()),
        price: Some(24.0),
        image_url: None,
        found_upc: true,
        brand: Some("DIBS Beauty".to_string()),
        size: None,
        color: None,
    }
}

fn test_router(aggregator: MockAggregator) -> Router {
    let store = Arc::new(MemoryStore::new());
    let models = Arc::new(ModelManager::stub());
    let verifier = ImageVerifier::new(models.clone(), Duration::from_secs(5)).expect("verifier");
    let enricher = Arc::new(Enricher::new(aggregator, store.clone(), verifier.clone()));
    router(HandlerState::new(enricher, store, models, verifier))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_model_states() {
    let response = test_router(MockAggregator::new())
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clip_model"], "not loaded");
    assert_eq!(body["text_model"], "not loaded");
}

#[tokio::test]
async fn enrich_rejects_missing_fields() {
    for (body, field) in [
        (json!({"brand_name": "DIBS", "upc": "123456789012"}), "name"),
        (json!({"name": "Lip Liner", "upc": "123456789012"}), "brand_name"),
        (json!({"name": "Lip Liner", "brand_name": "DIBS"}), "upc"),
    ] {
        let response = test_router(MockAggregator::new())
            .oneshot(post_json("/api/enrich", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains(field));
    }
}

#[tokio::test]
async fn enrich_rejects_malformed_upc() {
    let response = test_router(MockAggregator::new())
        .oneshot(post_json(
            "/api/enrich",
            json!({"name": "Lip Liner", "brand_name": "DIBS", "upc": "12ab"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("UPC"));
}

#[tokio::test]
async fn enrich_returns_scored_record() {
    let aggregator = MockAggregator::with_candidates(vec![candidate()]);
    let response = test_router(aggregator)
        .oneshot(post_json(
            "/api/enrich",
            json!({"name": "Lip Liner", "brand_name": "DIBS Beauty", "upc": "123456789012"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["upc"], "123456789012");
    assert_eq!(body["cached"], false);
    assert!(body["confidence_score"].as_u64().unwrap() <= 100);
    assert_eq!(body["verification"]["is_exact_match"], true);
    assert!(body["image_verification"].is_null());
}

#[tokio::test]
async fn enrich_upstream_failure_is_bad_gateway() {
    let aggregator = MockAggregator::new();
    aggregator.set_fail(true);
    let response = test_router(aggregator)
        .oneshot(post_json(
            "/api/enrich",
            json!({"name": "Lip Liner", "brand_name": "DIBS", "upc": "123456789012"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn cache_listing_and_clearing() {
    let aggregator = MockAggregator::with_candidates(vec![candidate()]);
    let app = test_router(aggregator);

    // Populate via a persisting enrichment.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/enrich",
            json!({"name": "Lip Liner", "brand_name": "DIBS Beauty", "upc": "123456789012"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["persisted"], true);

    let response = app.clone().oneshot(get("/api/cache")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["upc"], "123456789012");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("1"));

    let response = app.oneshot(get("/api/cache")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn verify_image_requires_image_url() {
    let response = test_router(MockAggregator::new())
        .oneshot(post_json(
            "/verify-image",
            json!({"expected_brand": "DIBS", "expected_product": "Lip Liner"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("image_url"));
}

#[tokio::test]
async fn verify_image_returns_policy_result() {
    let response = test_router(MockAggregator::new())
        .oneshot(post_json(
            "/verify-image",
            json!({
                "image_url": "https://cdn.example.com/dibs-beauty-lip-liner.jpg",
                "expected_brand": "DIBS Beauty",
                "expected_product": "Lip Liner"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["verification"]["confidence"].as_u64().unwrap() <= 100);
    assert_eq!(body["raw_scores"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn compare_images_returns_similarity() {
    let response = test_router(MockAggregator::new())
        .oneshot(post_json(
            "/compare-images",
            json!({
                "image1_url": "https://cdn.example.com/a.jpg",
                "image2_url": "https://cdn.example.com/a.jpg"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["are_similar"], true);
    assert_eq!(body["image1_classification"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn extract_attributes_flags_sets() {
    let response = test_router(MockAggregator::new())
        .oneshot(post_json(
            "/extract-attributes",
            json!({"text": "holiday gift set with three lipsticks"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["is_set"], true);
    assert_eq!(body["all_product_scores"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn preload_initializes_stub_handles() {
    let store = Arc::new(MemoryStore::new());
    let models = Arc::new(ModelManager::stub());
    let verifier = ImageVerifier::new(models.clone(), Duration::from_secs(5)).expect("verifier");
    let enricher = Arc::new(Enricher::new(
        MockAggregator::new(),
        store.clone(),
        verifier.clone(),
    ));
    let app = router(HandlerState::new(enricher, store, models.clone(), verifier));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/preload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(models.clip_state().as_str(), "stub");
    assert_eq!(models.text_state().as_str(), "stub");
}
