//! Request handlers for the prediction service

use super::state::AppState;
use crate::error::{Result, StemflowError};
use crate::training::ModelKind;
use axum::{extract::State, Json};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// One record to predict on, matching the raw dataset schema.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub year: i64,
    pub female_enrollment: f64,
    pub gender_gap_index: f64,
    pub country: String,
    pub stem_fields: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Prediction outcome. Both variants serialize under HTTP 200: the
/// endpoint's contract is success-shaped output carrying either a
/// prediction or an error string.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Ok { prediction: f64, model: String },
    Error { error: String },
}

/// `GET /`
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the Women-in-STEM Predictor API!" }))
}

/// `POST /predict`
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Json<PredictResponse> {
    match run_prediction(&state, &request) {
        Ok((prediction, kind)) => Json(PredictResponse::Ok {
            prediction,
            model: kind.as_str().to_string(),
        }),
        Err(e) => {
            warn!(error = %e, "Prediction failed");
            Json(PredictResponse::Error {
                error: e.to_string(),
            })
        }
    }
}

fn run_prediction(state: &AppState, request: &PredictRequest) -> Result<(f64, ModelKind)> {
    let df = df!(
        "year" => &[request.year],
        "female_enrollment" => &[request.female_enrollment],
        "gender_gap_index" => &[request.gender_gap_index],
        "country" => &[request.country.as_str()],
        "stem_fields" => &[request.stem_fields.as_str()]
    )
    .map_err(|e| StemflowError::PredictionError(e.to_string()))?;

    let x = state.preprocessor.transform(&df)?;

    let (kind, model) = state
        .resolve_model(request.model_name.as_deref())
        .ok_or_else(|| StemflowError::PredictionError("no models loaded".to_string()))?;

    let predictions = model.predict(&x)?;
    let prediction = predictions
        .first()
        .copied()
        .ok_or_else(|| StemflowError::PredictionError("empty prediction".to_string()))?;

    Ok((prediction, kind))
}
