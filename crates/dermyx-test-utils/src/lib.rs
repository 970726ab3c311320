//! Fixture builders shared by the workspace's tests.

use dermyx_common::entities::{Disease, DiseaseCategory, GenderPreference, SeverityLevel, Symptom};

pub use pretty_assertions::{assert_eq, assert_ne};

/// A symptom with the given weight and otherwise neutral fields.
pub fn symptom(id: &str, severity_weight: f64) -> Symptom {
    Symptom {
        id: id.to_string(),
        name: format!("symptom {id}"),
        name_en: format!("Symptom {id}"),
        description: String::new(),
        severity_weight,
        is_primary: false,
        is_objective: false,
        category_id: None,
        search_keywords: Vec::new(),
        created_at: None,
    }
}

/// A moderate, non-common disease.
pub fn disease(id: &str) -> Disease {
    Disease {
        id: id.to_string(),
        name: format!("disease {id}"),
        name_en: format!("Disease {id}"),
        category_id: None,
        category: None,
        overview: String::new(),
        detailed_description: None,
        prevalence: 0.0,
        severity_level: SeverityLevel::Moderate,
        is_common: false,
        is_emergency: false,
        chronic: false,
        genetic_factor: false,
        contagious: false,
        gender_preference: GenderPreference::Both,
        age_group: Vec::new(),
        seasonal_pattern: Vec::new(),
        search_keywords: Vec::new(),
        icd10_code: None,
        created_at: None,
    }
}

pub fn common_disease(id: &str) -> Disease {
    Disease { is_common: true, ..disease(id) }
}

pub fn with_category(mut disease: Disease, id: &str, name: &str) -> Disease {
    disease.category_id = Some(id.to_string());
    disease.category = Some(DiseaseCategory {
        id: Some(id.to_string()),
        name: name.to_string(),
        name_en: None,
    });
    disease
}

/// Disease row as the store's JSON would carry it, embedded category included.
pub fn disease_json(disease: &Disease) -> serde_json::Value {
    serde_json::json!({
        "id": disease.id,
        "name": disease.name,
        "name_en": disease.name_en,
        "category_id": disease.category_id,
        "category": disease.category.as_ref().map(|c| serde_json::json!({
            "id": c.id, "name": c.name, "name_en": c.name_en
        })),
        "overview": disease.overview,
        "prevalence": disease.prevalence,
        "severity_level": disease.severity_level.as_str(),
        "is_common": disease.is_common,
        "is_emergency": disease.is_emergency,
        "search_keywords": null,
    })
}

pub fn symptom_json(symptom: &Symptom) -> serde_json::Value {
    serde_json::json!({
        "id": symptom.id,
        "name": symptom.name,
        "name_en": symptom.name_en,
        "description": null,
        "severity_weight": symptom.severity_weight,
        "is_primary": symptom.is_primary,
        "category_id": symptom.category_id,
        "search_keywords": symptom.search_keywords,
    })
}

/// One `disease_symptoms` row with both join targets embedded.
pub fn association_json(
    disease: &Disease,
    symptom: &Symptom,
    relevance_score: f64,
    frequency_percentage: f64,
    is_diagnostic: bool,
) -> serde_json::Value {
    serde_json::json!({
        "disease_id": disease.id,
        "symptom_id": symptom.id,
        "relevance_score": relevance_score,
        "frequency_percentage": frequency_percentage,
        "is_diagnostic": is_diagnostic,
        "stage": null,
        "disease": disease_json(disease),
        "symptom": symptom_json(symptom),
    })
}

/// Bind an ephemeral localhost port for a stub server.
pub async fn bind_local() -> std::io::Result<(tokio::net::TcpListener, String)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok((listener, format!("http://{addr}")))
}
