//! HTTP handlers for the coach engine.
//!
//! Request/response field names use camelCase, matching the mobile clients'
//! wire format.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::ml_engine::{Analysis, CoachEngine, ZONE_NOTE};

/// Last ingested watch snapshot, re-analyzable on demand.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSnapshot {
    pub steps: f64,
    pub avg_hr: f64,
    pub age: Option<f64>,
    pub weight: Option<f64>,
    pub received_at: DateTime<Utc>,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CoachEngine>,
    pub last_watch_snapshot: Arc<RwLock<Option<WatchSnapshot>>>,
}

impl AppState {
    pub fn new(engine: Arc<CoachEngine>) -> Self {
        Self {
            engine,
            last_watch_snapshot: Arc::new(RwLock::new(None)),
        }
    }
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRequest {
    pub steps: f64,
    pub avg_hr: f64,
    pub age: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnRequest {
    pub steps: f64,
    pub avg_hr: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBody {
    pub title: String,
    pub message: String,
    pub target_steps: f64,
    pub tips: Vec<String>,
    pub zone_pct: [f64; 2],
    pub zone_bpm_range: Option<[u32; 2]>,
    pub zone_note: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub cluster: u32,
    pub input: InputEcho,
    pub recommendation: RecommendationBody,
    pub sample_count: u64,
    pub retrained: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEcho {
    pub steps: f64,
    pub avg_hr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnResponse {
    pub sample_count: u64,
    pub retrained: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub sample_count: u64,
    pub cluster_count: usize,
}

fn analyze_response(analysis: Analysis, input: InputEcho) -> AnalyzeResponse {
    AnalyzeResponse {
        cluster: analysis.cluster_id,
        input,
        recommendation: RecommendationBody {
            title: analysis.title,
            message: analysis.message,
            target_steps: analysis.target_steps,
            tips: analysis.tips,
            zone_pct: analysis.zone_pct,
            zone_bpm_range: analysis.zone_bpm_range,
            zone_note: ZONE_NOTE,
        },
        sample_count: analysis.sample_count,
        retrained: analysis.retrained,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/recommendation/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<ObservationRequest>,
) -> Response {
    let age = req.age.filter(|a| a.is_finite());
    let weight = req.weight.filter(|w| w.is_finite());

    match state.engine.analyze(req.steps, req.avg_hr, age, weight) {
        Ok(analysis) => ApiResponse::ok(analyze_response(
            analysis,
            InputEcho {
                steps: req.steps,
                avg_hr: req.avg_hr,
                age,
                weight,
            },
        )),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

/// POST /api/watch/ingest — store the latest watch snapshot and record it
/// as a training sample.
pub async fn watch_ingest(
    State(state): State<AppState>,
    Json(req): Json<ObservationRequest>,
) -> Response {
    if !req.steps.is_finite() || !req.avg_hr.is_finite() {
        return ApiErrorResponse::bad_request("steps and avgHr are required numbers");
    }

    let outcome = match state.engine.record_sample(req.steps, req.avg_hr) {
        Ok(outcome) => outcome,
        Err(e) => return ApiErrorResponse::from_engine(&e),
    };

    let snapshot = WatchSnapshot {
        steps: req.steps,
        avg_hr: req.avg_hr,
        age: req.age.filter(|a| a.is_finite()),
        weight: req.weight.filter(|w| w.is_finite()),
        received_at: Utc::now(),
    };
    *state.last_watch_snapshot.write().await = Some(snapshot.clone());

    ApiResponse::ok(serde_json::json!({
        "latest": snapshot,
        "sampleCount": outcome.count,
        "retrained": outcome.retrained,
    }))
}

/// GET /api/watch/latest
pub async fn watch_latest(State(state): State<AppState>) -> Response {
    let snapshot = state.last_watch_snapshot.read().await.clone();
    ApiResponse::ok(serde_json::json!({ "latest": snapshot }))
}

/// GET /api/recommendation/latest — re-analyze the last watch snapshot
/// against the current rule table, without recording a new sample.
pub async fn recommendation_latest(State(state): State<AppState>) -> Response {
    let Some(snapshot) = state.last_watch_snapshot.read().await.clone() else {
        return ApiErrorResponse::not_found("no snapshot ingested");
    };

    let result = state.engine.recommend(
        snapshot.steps,
        snapshot.avg_hr,
        snapshot.age,
        snapshot.weight,
    );
    match result {
        Ok(analysis) => ApiResponse::ok(analyze_response(
            analysis,
            InputEcho {
                steps: snapshot.steps,
                avg_hr: snapshot.avg_hr,
                age: snapshot.age,
                weight: snapshot.weight,
            },
        )),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

/// POST /api/ml/learn — record a sample without producing a recommendation.
pub async fn learn(State(state): State<AppState>, Json(req): Json<LearnRequest>) -> Response {
    match state.engine.record_sample(req.steps, req.avg_hr) {
        Ok(outcome) => ApiResponse::ok(LearnResponse {
            sample_count: outcome.count,
            retrained: outcome.retrained,
        }),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

/// POST /api/ml/retrain — manual retrain; failures surface to the caller.
pub async fn retrain(State(state): State<AppState>) -> Response {
    match state.engine.retrain_now() {
        Ok(table) => ApiResponse::ok(table),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

/// GET /api/ml/rules — current rule table.
pub async fn rules(State(state): State<AppState>) -> Response {
    match state.engine.rules() {
        Ok(table) => ApiResponse::ok(table),
        Err(e) => ApiErrorResponse::from_engine(&e),
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let counts = state
        .engine
        .sample_count()
        .and_then(|samples| state.engine.rules().map(|table| (samples, table.len())));

    match counts {
        Ok((sample_count, cluster_count)) => ApiResponse::ok(HealthResponse {
            status: "ok",
            sample_count,
            cluster_count,
        }),
        Err(e) => {
            tracing::error!(error = %e, "Health check cannot reach storage");
            ApiResponse::with_status(
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: "degraded",
                    sample_count: 0,
                    cluster_count: 0,
                },
            )
        }
    }
}
