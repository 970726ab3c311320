//! Symptom listings.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct SymptomFilter {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SymptomSearch {
    #[serde(default)]
    pub q: String,
}

/// GET /api/symptoms: All symptoms, or one category's
pub async fn api_symptoms(
    State(state): State<SharedState>,
    Query(filter): Query<SymptomFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let category = filter.category.as_deref().filter(|c| !c.trim().is_empty());
    let symptoms = state.service.get_symptoms(category).await?;
    Ok(Json(symptoms))
}

/// GET /api/symptoms/search: Keyword search
pub async fn api_symptom_search(
    State(state): State<SharedState>,
    Query(search): Query<SymptomSearch>,
) -> Result<impl IntoResponse, ApiError> {
    let symptoms = state.service.search_symptoms(&search.q).await?;
    Ok(Json(symptoms))
}

/// GET /api/symptom-categories
pub async fn api_symptom_categories(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.service.get_symptom_categories().await?;
    Ok(Json(categories))
}
