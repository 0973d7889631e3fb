//! API regression tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the endpoints using `tower::ServiceExt::oneshot()`. No binary spawn, no
//! network port.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use fitadvisor::api::{create_app, AppState};
use fitadvisor::config::MlConfig;
use fitadvisor::ml_engine::CoachEngine;
use fitadvisor::storage::{MemoryStore, StoreError};
use fitadvisor::{RuleStore, RuleTable, Sample, SampleStore};

fn create_test_state(retrain_every: u64) -> AppState {
    let store = Arc::new(MemoryStore::new());
    let engine = CoachEngine::new(
        store.clone(),
        store,
        MlConfig {
            retrain_every,
            ..MlConfig::default()
        },
    );
    AppState::new(Arc::new(engine))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
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

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_app(create_test_state(0));
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    assert_eq!(v["data"]["status"], "ok");
    assert_eq!(v["data"]["clusterCount"], 3);
    assert_eq!(v["data"]["sampleCount"], 0);
}

/// Store whose every operation fails, simulating unreachable storage.
struct OfflineStore;

impl SampleStore for OfflineStore {
    fn append(&self, _sample: &Sample) -> Result<u64, StoreError> {
        Err(StoreError::Database("storage offline".to_string()))
    }

    fn read_all(&self) -> Result<Vec<Sample>, StoreError> {
        Err(StoreError::Database("storage offline".to_string()))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::Database("storage offline".to_string()))
    }
}

impl RuleStore for OfflineStore {
    fn read(&self) -> Result<RuleTable, StoreError> {
        Err(StoreError::Database("storage offline".to_string()))
    }

    fn write(&self, _table: &RuleTable) -> Result<(), StoreError> {
        Err(StoreError::Database("storage offline".to_string()))
    }
}

#[tokio::test]
async fn test_health_reports_degraded_storage() {
    let engine = CoachEngine::new(
        Arc::new(OfflineStore),
        Arc::new(OfflineStore),
        MlConfig::default(),
    );
    let app = create_app(AppState::new(Arc::new(engine)));

    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let v = body_json(resp).await;
    assert_eq!(v["data"]["status"], "degraded");
}

#[tokio::test]
async fn test_analyze_returns_recommendation() {
    let state = create_test_state(0);
    let app = create_app(state.clone());

    let resp = app
        .oneshot(post_json(
            "/api/recommendation/analyze",
            serde_json::json!({"steps": 8200, "avgHr": 115, "age": 30, "weight": 75}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    let cluster = v["data"]["cluster"].as_u64().unwrap();
    assert!((1..=3).contains(&cluster));
    assert_eq!(v["data"]["input"]["steps"], 8200.0);
    assert_eq!(v["data"]["recommendation"]["targetSteps"], 9200.0);
    assert!(v["data"]["recommendation"]["message"]
        .as_str()
        .unwrap()
        .contains("adim"));
    assert!(v["data"]["recommendation"]["zoneBpmRange"].is_array());
    assert_eq!(v["data"]["sampleCount"], 1);

    // The analyze recorded a sample
    let health = create_app(state).oneshot(get("/health")).await.unwrap();
    let v = body_json(health).await;
    assert_eq!(v["data"]["sampleCount"], 1);
}

#[tokio::test]
async fn test_analyze_rejects_missing_fields() {
    let app = create_app(create_test_state(0));
    let resp = app
        .oneshot(post_json(
            "/api/recommendation/analyze",
            serde_json::json!({"steps": 8200}),
        ))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_manual_retrain_surfaces_insufficient_data() {
    let app = create_app(create_test_state(0));
    let resp = app
        .oneshot(post_json("/api/ml/retrain", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "INSUFFICIENT_DATA");
}

#[tokio::test]
async fn test_learn_then_retrain_updates_rules() {
    let state = create_test_state(0);

    for (steps, hr) in [
        (1000.0, 70.0),
        (1000.0, 72.0),
        (9000.0, 140.0),
        (9500.0, 145.0),
        (15000.0, 160.0),
    ] {
        let app = create_app(state.clone());
        let resp = app
            .oneshot(post_json(
                "/api/ml/learn",
                serde_json::json!({"steps": steps, "avgHr": hr}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = create_app(state.clone())
        .oneshot(post_json("/api/ml/retrain", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    let clusters = v["data"]["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 3);
    let steps: Vec<f64> = clusters
        .iter()
        .map(|c| c["steps"].as_f64().unwrap())
        .collect();
    assert!(steps.windows(2).all(|w| w[0] < w[1]));

    // Rules endpoint reflects the persisted table
    let resp = create_app(state).oneshot(get("/api/ml/rules")).await.unwrap();
    let v = body_json(resp).await;
    assert_eq!(v["data"]["clusters"][0]["title"], "Dusuk Tempo");
}

#[tokio::test]
async fn test_watch_flow() {
    let state = create_test_state(0);

    // No snapshot yet
    let resp = create_app(state.clone())
        .oneshot(get("/api/recommendation/latest"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = create_app(state.clone())
        .oneshot(post_json(
            "/api/watch/ingest",
            serde_json::json!({"steps": 2500, "avgHr": 88, "age": 41}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["sampleCount"], 1);

    let resp = create_app(state.clone())
        .oneshot(get("/api/watch/latest"))
        .await
        .unwrap();
    let v = body_json(resp).await;
    assert_eq!(v["data"]["latest"]["steps"], 2500.0);
    assert_eq!(v["data"]["latest"]["avgHr"], 88.0);

    // Re-analysis of the snapshot does not record another sample
    let resp = create_app(state.clone())
        .oneshot(get("/api/recommendation/latest"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["recommendation"]["targetSteps"], 3500.0);

    let resp = create_app(state).oneshot(get("/health")).await.unwrap();
    let v = body_json(resp).await;
    assert_eq!(v["data"]["sampleCount"], 1);
}
