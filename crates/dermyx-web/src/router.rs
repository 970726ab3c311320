//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    diagnose::api_diagnose,
    diseases::{api_disease_search, api_disease_detail, api_disease_treatments},
    symptoms::{api_symptoms, api_symptom_search, api_symptom_categories},
    status::{api_status, health},
    image::{api_image_predict, api_image_refine},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/health", get(health))

        // API endpoints
        .route("/api/diagnose",                  post(api_diagnose))
        .route("/api/diseases/search",           get(api_disease_search))
        .route("/api/diseases/{id}",             get(api_disease_detail))
        .route("/api/diseases/{id}/treatments",  get(api_disease_treatments))
        .route("/api/symptoms",                  get(api_symptoms))
        .route("/api/symptoms/search",           get(api_symptom_search))
        .route("/api/symptom-categories",        get(api_symptom_categories))
        .route("/api/status",                    get(api_status))
        .route("/api/image/predict",             post(api_image_predict))
        .route("/api/image/refine",              post(api_image_refine))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
