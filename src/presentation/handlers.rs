// HTTP request handlers
use crate::application::analysis_service::{AnalysisError, AnalysisRequest};
use crate::application::battery_health::HealthError;
use crate::application::comparison_service::{ComparisonError, ComparisonRequest};
use crate::infrastructure::log_parser::ParseError;
use crate::presentation::app_state::AppState;
use crate::presentation::views;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::health::CycleStrategy;

#[derive(Deserialize)]
pub struct AnalyzeQuery {
    pub full_charge_voltage: Option<f64>,
    pub cycle_strategy: Option<CycleStrategy>,
    pub nominal_capacity_ah: Option<f64>,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub drop_first_sample: Option<bool>,
}

#[derive(Deserialize)]
pub struct CompareBody {
    pub full: serde_json::Value,
    pub sample: serde_json::Value,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub reference_voltage: Option<f64>,
    #[serde(default)]
    pub cycle_strategy: Option<CycleStrategy>,
    #[serde(default)]
    pub drop_first_sample: Option<bool>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Analyze one uploaded log export. The body is the raw JSON document as the
/// device exports it; parameters arrive as query string overrides.
pub async fn analyze_document(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
    body: Bytes,
) -> Response {
    let request = AnalysisRequest {
        full_charge_voltage: query.full_charge_voltage,
        cycle_strategy: query.cycle_strategy,
        nominal_capacity_ah: query.nominal_capacity_ah,
        window_start: query.window_start,
        window_end: query.window_end,
        drop_first_sample: query.drop_first_sample,
    };

    match state.analysis_service.analyze(&body, &request) {
        Ok(analysis) => Json(views::analysis_view(analysis)).into_response(),
        Err(e) => analysis_error_response(e),
    }
}

/// Compare a full export against a sampled export of the same device.
pub async fn compare_documents(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompareBody>,
) -> Response {
    let request = ComparisonRequest {
        metrics: body.metrics,
        reference_voltage: body.reference_voltage,
        cycle_strategy: body.cycle_strategy,
        drop_first_sample: body.drop_first_sample,
    };

    match state
        .comparison_service
        .compare(&body.full, &body.sample, &request)
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => comparison_error_response(e),
    }
}

fn analysis_error_response(error: AnalysisError) -> Response {
    let status = match &error {
        AnalysisError::Parse(parse) => parse_status(parse),
        AnalysisError::NoSeries => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Health(HealthError::InvalidParameter(_)) => StatusCode::BAD_REQUEST,
        AnalysisError::Health(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, error.to_string()).into_response()
}

fn comparison_error_response(error: ComparisonError) -> Response {
    let status = match &error {
        ComparisonError::Parse(parse) => parse_status(parse),
        ComparisonError::MissingSeries { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ComparisonError::Health(HealthError::InvalidParameter(_)) => StatusCode::BAD_REQUEST,
        ComparisonError::Health(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, error.to_string()).into_response()
}

fn parse_status(error: &ParseError) -> StatusCode {
    match error {
        ParseError::Format(_) => StatusCode::BAD_REQUEST,
        ParseError::Structure(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
