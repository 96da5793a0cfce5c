use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::context::RiskContext;
use crate::error::AppError;
use crate::features::LocationQuery;
use crate::history::{title_case, BarangaySummary};
use crate::risk::RiskTier;

pub const PREDICTION_METHOD: &str = "machine_learning";
const DEFAULT_STATION: &str = "unknown";
const SERVICE_NAME: &str = "Accident Prone Area Prediction API (ML-Powered)";

/// Router exposing prediction and location directory endpoints.
pub fn risk_router(context: Arc<RiskContext>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/api/check_location", post(check_location))
        .route("/api/barangay_list", get(barangay_list))
        .route("/api/municipalities", get(municipalities))
        .route("/api/barangays", get(barangays))
        .with_state(context)
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckLocationRequest {
    #[serde(default)]
    pub barangay: Option<String>,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckLocationResponse {
    pub barangay: String,
    pub station: String,
    pub is_accident_prone: bool,
    pub ml_confidence: f64,
    pub accident_count: u64,
    pub fatal_accidents: u64,
    pub risk_level: RiskTier,
    pub confidence: f64,
    pub common_offense: String,
    pub message: String,
    pub timestamp: String,
    pub prediction_method: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct BarangayListParams {
    #[serde(default)]
    pub accident_prone_only: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BarangayListResponse {
    pub barangays: Vec<BarangaySummary>,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MunicipalitiesResponse {
    pub municipalities: Vec<String>,
    pub total_count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct BarangaysParams {
    #[serde(default)]
    pub municipality: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BarangaysResponse {
    pub municipality: String,
    pub barangays: Vec<String>,
    pub total_count: usize,
}

pub(crate) async fn check_location(
    State(context): State<Arc<RiskContext>>,
    payload: Result<Json<CheckLocationRequest>, JsonRejection>,
) -> Result<Json<CheckLocationResponse>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let barangay = request
        .barangay
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if barangay.is_empty() {
        return Err(AppError::bad_request("Barangay name is required"));
    }
    let station = request
        .station
        .as_deref()
        .unwrap_or(DEFAULT_STATION)
        .trim()
        .to_lowercase();

    let query = LocationQuery::new(&barangay, &station)
        .with_timestamp(request.timestamp.as_deref())
        .with_vehicle_type(request.vehicle_type.as_deref())
        .with_weather(request.weather.as_deref());
    let assessment = context.assess(&query)?;

    info!(
        barangay = %barangay,
        station = %station,
        confidence = assessment.confidence,
        risk_level = %assessment.risk_level,
        prone = assessment.is_accident_prone,
        "location assessed"
    );

    Ok(Json(CheckLocationResponse {
        barangay: title_case(&barangay),
        station: title_case(&station),
        is_accident_prone: assessment.is_accident_prone,
        ml_confidence: assessment.confidence,
        accident_count: assessment.history.total_accidents,
        fatal_accidents: assessment.history.fatal_accidents,
        risk_level: assessment.risk_level,
        confidence: assessment.confidence,
        common_offense: assessment.history.most_common_offense,
        message: assessment.message,
        timestamp: Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
        prediction_method: PREDICTION_METHOD,
    }))
}

pub(crate) async fn barangay_list(
    State(context): State<Arc<RiskContext>>,
    Query(params): Query<BarangayListParams>,
) -> Json<BarangayListResponse> {
    let prone_only = params
        .accident_prone_only
        .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
    let barangays = context.statistics().barangay_list(prone_only);

    Json(BarangayListResponse {
        total_count: barangays.len(),
        barangays,
    })
}

pub(crate) async fn municipalities(
    State(context): State<Arc<RiskContext>>,
) -> Json<MunicipalitiesResponse> {
    let municipalities = context.statistics().municipalities();

    Json(MunicipalitiesResponse {
        total_count: municipalities.len(),
        municipalities,
    })
}

pub(crate) async fn barangays(
    State(context): State<Arc<RiskContext>>,
    Query(params): Query<BarangaysParams>,
) -> Result<Json<BarangaysResponse>, AppError> {
    let municipality = params
        .municipality
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if municipality.is_empty() {
        return Err(AppError::bad_request("Municipality parameter is required"));
    }

    let barangays = context.statistics().barangays_in(&municipality);

    Ok(Json(BarangaysResponse {
        municipality: title_case(&municipality),
        total_count: barangays.len(),
        barangays,
    }))
}

pub(crate) async fn service_info(State(context): State<Arc<RiskContext>>) -> Json<Value> {
    let metadata = context.metadata();

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "model": {
            "type": metadata.model_type,
            "accuracy": metadata.accuracy,
            "features": context.feature_count(),
        },
        "endpoints": {
            "POST /api/check_location": "ML prediction for accident risk",
            "GET /api/barangay_list": "Get list of all barangays",
            "GET /api/municipalities": "Get list of municipalities",
            "GET /api/barangays": "Get barangays by municipality",
        }
    }))
}
