//! Symptom-based diagnosis.

use axum::{extract::State, response::IntoResponse, Json};
use dermyx_db::DataMode;
use dermyx_engine::DiagnosisCandidate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default)]
    pub symptom_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub mode: DataMode,
    pub candidates: Vec<DiagnosisCandidate>,
}

/// POST /api/diagnose: Rank candidate diseases for the selected symptoms
pub async fn api_diagnose(
    State(state): State<SharedState>,
    Json(req): Json<DiagnoseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let candidates = state.service.diagnose_by_symptoms(&req.symptom_ids).await?;
    Ok(Json(DiagnoseResponse { mode: state.mode, candidates }))
}
