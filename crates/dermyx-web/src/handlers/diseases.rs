//! Disease search, detail and treatments.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use dermyx_common::entities::SeverityLevel;
use dermyx_db::DiseaseQuery;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    /// Comma-separated severity levels, e.g. `mild,moderate`
    pub severity: Option<String>,
    pub common: Option<bool>,
    pub emergency: Option<bool>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl SearchParams {
    fn into_query(self) -> Result<DiseaseQuery, ApiError> {
        let severity = match self.severity.as_deref() {
            Some(list) => parse_severities(list)?,
            None => Vec::new(),
        };
        Ok(DiseaseQuery {
            text: self.q,
            category_id: self.category.filter(|c| !c.trim().is_empty()),
            severity,
            is_common: self.common,
            is_emergency: self.emergency,
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(20),
        })
    }
}

fn parse_severities(list: &str) -> Result<Vec<SeverityLevel>, ApiError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
                .map_err(|_| ApiError::BadRequest(format!("unknown severity level: {s}")))
        })
        .collect()
}

/// GET /api/diseases/search: Paged substring search
pub async fn api_disease_search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.into_query()?;
    let page = state.service.search_diseases(&query).await?;
    Ok(Json(page))
}

/// GET /api/diseases/{id}
pub async fn api_disease_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.service.get_disease(&id).await? {
        Some(disease) => Ok(Json(disease)),
        None => Err(ApiError::NotFound(format!("disease {id}"))),
    }
}

/// GET /api/diseases/{id}/treatments: First-line treatments first
pub async fn api_disease_treatments(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let treatments = state.service.get_treatments(&id).await?;
    Ok(Json(treatments))
}
