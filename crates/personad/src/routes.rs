//! API routes for personad
//!
//! Two public endpoints: an unauthenticated connectivity test and the
//! analysis endpoint, plus a liveness route. The analyze body is
//! decoded tolerantly so contract violations come back as 400 with the
//! documented error shape rather than the framework's default 422.

use crate::server::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use persona_common::capability::{Decision, RequestDescriptor};
use persona_common::{AnalysisOptions, AnalysisRequest, AnalysisType, AnalyzeError, ValidationError};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

type AppStateArc = Arc<AppState>;

type ErrorReply = (StatusCode, Json<Value>);

// ============================================================================
// Analysis Routes
// ============================================================================

pub fn analysis_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api-analysis/test", get(test_service))
        .route("/api-analysis/analyze", post(analyze))
}

#[derive(Debug, Serialize)]
struct TestResponse {
    message: String,
    timestamp: String,
    treblle_configured: bool,
    ollama_status: String,
    available_models: Vec<String>,
    environment: String,
}

/// Connectivity check. Never fails, even when Ollama is down.
async fn test_service(State(state): State<AppStateArc>) -> Json<TestResponse> {
    let probe = state.ollama.probe().await;

    Json(TestResponse {
        message: "AI API Analysis is working!".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        treblle_configured: crate::config::PersonadConfig::treblle_configured(),
        ollama_status: probe.status().to_string(),
        available_models: probe.models,
        environment: state.config.server.environment.clone(),
    })
}

async fn analyze(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ErrorReply> {
    let descriptor = RequestDescriptor::new(
        client_key(&headers),
        "/api-analysis/analyze",
        "POST",
    );
    if let Decision::Deny(reason) = state.rate_limiter.check(&descriptor) {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests", "message": reason })),
        ));
    }

    let request = decode_request(&body).map_err(|e| {
        warn!("Rejected analyze request: {}", e);
        (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
    })?;

    match state.analyzer.analyze(&request).await {
        Ok(result) => {
            let message = format!(
                "Analysis completed successfully using {}",
                result.model_used
            );
            Ok(Json(json!({
                "data": result,
                "message": message,
                "cached": false,
            })))
        }
        Err(AnalyzeError::Validation(e)) => {
            warn!("Validation failed: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            ))
        }
        Err(AnalyzeError::Internal(details)) => {
            error!("Analysis failed: {}", details);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to analyze API", "details": details })),
            ))
        }
    }
}

/// Hand-rolled request decode so missing fields and unknown types map
/// to the contract's 400 shape.
fn decode_request(body: &Value) -> Result<AnalysisRequest, ValidationError> {
    let input = body
        .get("input")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let type_str = body.get("type").and_then(Value::as_str).unwrap_or_default();

    if input.is_empty() || type_str.is_empty() {
        return Err(ValidationError::MissingField("input and type"));
    }

    let analysis_type: AnalysisType = type_str.parse()?;
    let model = body
        .get("options")
        .and_then(|o| o.get("model"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AnalysisRequest {
        input: input.to_string(),
        analysis_type,
        options: AnalysisOptions { model },
    })
}

/// Caller key for throttling: first hop of X-Forwarded-For, or a
/// constant for direct connections.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
