//! Catalog status and liveness.

use axum::{extract::State, response::IntoResponse, Json};
use dermyx_db::{DataMode, StoreHealth};
use serde::Serialize;
use serde_json::json;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub mode: DataMode,
    pub classifier: bool,
    pub health: StoreHealth,
}

/// GET /api/status: Which catalog is serving and whether its tables hold data
pub async fn api_status(State(state): State<SharedState>) -> impl IntoResponse {
    let health = state.service.catalog().health().await;
    Json(StatusResponse {
        mode: state.mode,
        classifier: state.classifier.is_some(),
        health,
    })
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
