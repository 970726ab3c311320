//! Diagnosis service facade.
//!
//! Holds the catalog chosen at startup plus the scoring calibration. It has
//! no mutable state, so one instance is shared across all requests.

use std::collections::HashSet;
use std::sync::Arc;

use dermyx_common::entities::{Disease, Symptom, SymptomCategory, Treatment};
use dermyx_common::ScoringConfig;
use dermyx_db::{CatalogProvider, DiseasePage, DiseaseQuery, Result};
use tracing::{debug, instrument};

use crate::enrich::enrich;
use crate::scorer::{score_associations, DiagnosisCandidate};

#[derive(Clone)]
pub struct DiagnosisService {
    catalog: Arc<dyn CatalogProvider>,
    calibration: ScoringConfig,
}

impl DiagnosisService {
    pub fn new(catalog: Arc<dyn CatalogProvider>, calibration: ScoringConfig) -> Self {
        Self { catalog, calibration }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        &self.catalog
    }

    pub fn calibration(&self) -> &ScoringConfig {
        &self.calibration
    }

    /// Ranked candidate diseases for the given symptom ids.
    ///
    /// Duplicate ids count once. An empty request returns an empty list
    /// without touching the catalog; store failures propagate unchanged.
    #[instrument(skip(self))]
    pub async fn diagnose_by_symptoms(&self, symptom_ids: &[String]) -> Result<Vec<DiagnosisCandidate>> {
        let ids = dedup_ids(symptom_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let data = self.catalog.fetch_associations(&ids).await?;
        let mut candidates = score_associations(&data, ids.len(), &self.calibration);
        enrich(&mut candidates);

        debug!(
            requested = ids.len(),
            rows = data.len(),
            candidates = candidates.len(),
            "Diagnosis scored"
        );
        Ok(candidates)
    }

    pub async fn get_disease(&self, id: &str) -> Result<Option<Disease>> {
        self.catalog.fetch_disease(id).await
    }

    pub async fn get_treatments(&self, disease_id: &str) -> Result<Vec<Treatment>> {
        self.catalog.fetch_treatments(disease_id).await
    }

    pub async fn get_symptoms(&self, category_id: Option<&str>) -> Result<Vec<Symptom>> {
        self.catalog.fetch_symptoms(category_id).await
    }

    /// Case-insensitive keyword search over the catalog's symptoms.
    /// A blank query returns every symptom.
    pub async fn search_symptoms(&self, query: &str) -> Result<Vec<Symptom>> {
        let needle = query.trim().to_lowercase();
        let symptoms = self.catalog.fetch_symptoms(None).await?;
        Ok(symptoms
            .into_iter()
            .filter(|s| needle.is_empty() || s.matches_keyword(&needle))
            .collect())
    }

    pub async fn get_symptom_categories(&self) -> Result<Vec<SymptomCategory>> {
        self.catalog.fetch_symptom_categories().await
    }

    pub async fn search_diseases(&self, query: &DiseaseQuery) -> Result<DiseasePage> {
        self.catalog.search_diseases(query).await
    }
}

/// Trimmed, non-empty ids in first-occurrence order.
pub fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let ids: Vec<String> = ["sym_002", "sym_001", "sym_002", " ", "sym_001 "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedup_ids(&ids), vec!["sym_002".to_string(), "sym_001".to_string()]);
    }
}
