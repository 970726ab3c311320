/// Reference entities of the dermatology catalog.
/// These are Rust representations of the remote store's tables; field names and
/// enum spellings follow the column values stored there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The store emits SQL NULL for empty array and text columns.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomCategory {
    pub id: String,
    pub name: String,
    pub name_en: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

/// Category reference embedded in disease rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseCategory {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
}

// ---------------------------------------------------------------------------
// Symptom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: String,
    pub name: String,
    pub name_en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Relative importance of the symptom, independent of any disease.
    pub severity_weight: f64,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_objective: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Symptom {
    /// Case-insensitive keyword match over keywords, name and English name.
    pub fn matches_keyword(&self, needle_lower: &str) -> bool {
        self.search_keywords
            .iter()
            .any(|k| k.to_lowercase().contains(needle_lower))
            || self.name.to_lowercase().contains(needle_lower)
            || self.name_en.to_lowercase().contains(needle_lower)
    }
}

// ---------------------------------------------------------------------------
// Disease
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Mild,
    Moderate,
    High,
    Severe,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low      => "low",
            SeverityLevel::Mild     => "mild",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::High     => "high",
            SeverityLevel::Severe   => "severe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderPreference {
    Male,
    Female,
    #[default]
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub name_en: String,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Embedded category, present when the row was fetched with its join.
    #[serde(default)]
    pub category: Option<DiseaseCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub detailed_description: Option<String>,
    /// Fraction in [0, 1].
    #[serde(default)]
    pub prevalence: f64,
    pub severity_level: SeverityLevel,
    #[serde(default)]
    pub is_common: bool,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub chronic: bool,
    #[serde(default)]
    pub genetic_factor: bool,
    #[serde(default)]
    pub contagious: bool,
    #[serde(default)]
    pub gender_preference: GenderPreference,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age_group: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seasonal_pattern: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub icd10_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Disease {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Case-insensitive substring match over name, English name and overview.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.name_en.to_lowercase().contains(needle_lower)
            || self.overview.to_lowercase().contains(needle_lower)
    }
}

// ---------------------------------------------------------------------------
// Treatment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentType {
    Topical,
    Oral,
    Injection,
    Procedure,
    Lifestyle,
    Alternative,
}

/// Evidence grade, A strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceLevel {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Otc,
    Prescription,
    HospitalOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: String,
    pub disease_id: String,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(rename = "type")]
    pub treatment_type: TreatmentType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    pub effectiveness_score: f64,
    pub evidence_level: EvidenceLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub side_effects: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub cost_level: Option<CostLevel>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub first_line: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(SeverityLevel::Low < SeverityLevel::Mild);
        assert!(SeverityLevel::Moderate < SeverityLevel::High);
        assert!(SeverityLevel::High < SeverityLevel::Severe);
    }

    #[test]
    fn test_treatment_type_uses_column_name() {
        let json = r#"{
            "id": "t1", "disease_id": "d1", "name": "Emollient",
            "type": "topical", "effectiveness_score": 2.5,
            "evidence_level": "A", "first_line": true,
            "availability": "hospital_only"
        }"#;
        let t: Treatment = serde_json::from_str(json).unwrap();
        assert_eq!(t.treatment_type, TreatmentType::Topical);
        assert_eq!(t.evidence_level, EvidenceLevel::A);
        assert_eq!(t.availability, Some(Availability::HospitalOnly));
        assert!(t.side_effects.is_empty());
    }

    #[test]
    fn test_null_columns_decode_to_defaults() {
        let json = r#"{
            "id": "dis_x", "name": "x", "name_en": "X",
            "severity_level": "mild", "icd10_code": null,
            "overview": null, "age_group": null, "search_keywords": ["x"]
        }"#;
        let d: Disease = serde_json::from_str(json).unwrap();
        assert_eq!(d.gender_preference, GenderPreference::Both);
        assert!(d.icd10_code.is_none());
        assert!(d.overview.is_empty());
        assert!(d.age_group.is_empty());
        assert_eq!(d.search_keywords, vec!["x".to_string()]);
        assert!(d.category_name().is_none());
    }
}
