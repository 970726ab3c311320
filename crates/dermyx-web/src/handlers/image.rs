//! Image classifier proxy.

use axum::{extract::State, response::IntoResponse, Json};
use dermyx_engine::ImagePrediction;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Data URL or bare base64
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub initial_results: Vec<ImagePrediction>,
    /// Selected symptom names
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub results: Vec<ImagePrediction>,
}

/// POST /api/image/predict
pub async fn api_image_predict(
    State(state): State<SharedState>,
    Json(req): Json<PredictRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let classifier = state.classifier.as_ref().ok_or(ApiError::ClassifierUnavailable)?;
    let results = classifier.predict_image(&req.image).await?;
    Ok(Json(PredictionResponse { results }))
}

/// POST /api/image/refine: Re-rank predictions with the selected symptoms
pub async fn api_image_refine(
    State(state): State<SharedState>,
    Json(req): Json<RefineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let classifier = state.classifier.as_ref().ok_or(ApiError::ClassifierUnavailable)?;
    let results = classifier.refine_diagnosis(&req.initial_results, &req.symptoms).await?;
    Ok(Json(PredictionResponse { results }))
}
