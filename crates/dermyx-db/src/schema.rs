//! Row shapes exchanged with the remote store and handed to the scoring engine.
//!
//! Raw join rows from the store are loosely shaped: an embedded disease or
//! symptom can be missing when the referenced record was deleted or hidden by
//! row-level security. They are validated here, at the boundary, into
//! `AssociationRow`s that always carry both sides of the join.

use std::collections::{BTreeMap, HashMap};

use dermyx_common::entities::{Disease, SeverityLevel, Symptom};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// =============================================================================
// Table names
// =============================================================================

pub const TABLE_SYMPTOMS: &str = "symptoms";
pub const TABLE_SYMPTOM_CATEGORIES: &str = "symptom_categories";
pub const TABLE_DISEASES: &str = "diseases";
pub const TABLE_DISEASE_SYMPTOMS: &str = "disease_symptoms";
pub const TABLE_TREATMENTS: &str = "treatments";

/// Tables read by the health check.
pub const CORE_TABLES: [&str; 4] = [
    TABLE_DISEASES,
    TABLE_SYMPTOMS,
    TABLE_DISEASE_SYMPTOMS,
    TABLE_TREATMENTS,
];

/// Disease columns with the category name embedded.
pub const DISEASE_SELECT: &str = "*,category:disease_categories(id,name,name_en)";

/// Association columns with both join targets embedded.
pub const ASSOCIATION_SELECT: &str = "disease_id,symptom_id,relevance_score,frequency_percentage,\
is_diagnostic,stage,disease:diseases(*,category:disease_categories(id,name,name_en)),symptom:symptoms(*)";

// =============================================================================
// Association rows
// =============================================================================

/// One validated (disease, symptom) association with full relevance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRow {
    pub disease: Disease,
    pub symptom: Symptom,
    pub relevance_score: f64,
    pub frequency_percentage: f64,
    pub is_diagnostic: bool,
    pub stage: Option<String>,
}

/// A bare disease → symptom link, used when only symptom-id lists are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRow {
    pub disease: Disease,
    pub symptom: Symptom,
    /// Number of symptoms the disease lists in total.
    pub disease_symptom_count: usize,
}

/// Association data for one request, in whichever shape the provider has.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationData {
    /// Relevance / frequency / diagnostic metadata is available.
    Weighted(Vec<AssociationRow>),
    /// Only the disease → symptom-id mapping is available.
    Linked(Vec<LinkedRow>),
}

impl AssociationData {
    pub fn len(&self) -> usize {
        match self {
            AssociationData::Weighted(rows) => rows.len(),
            AssociationData::Linked(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Join row exactly as the store returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAssociationRow {
    #[serde(default)]
    pub disease_id: Option<String>,
    #[serde(default)]
    pub symptom_id: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub frequency_percentage: Option<f64>,
    #[serde(default)]
    pub is_diagnostic: Option<bool>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub disease: Option<Disease>,
    #[serde(default)]
    pub symptom: Option<Symptom>,
}

impl RawAssociationRow {
    /// Resolve the row, or `None` when a join target or weight is missing.
    pub fn validate(self) -> Option<AssociationRow> {
        let disease = self.disease?;
        let symptom = self.symptom?;
        let relevance_score = self.relevance_score.filter(|v| v.is_finite())?;
        let frequency_percentage = self.frequency_percentage.filter(|v| v.is_finite())?;

        Some(AssociationRow {
            disease,
            symptom,
            relevance_score,
            frequency_percentage,
            is_diagnostic: self.is_diagnostic.unwrap_or(false),
            stage: self.stage,
        })
    }
}

/// Validate a batch of store rows, dropping and logging the unusable ones.
///
/// A row that does not decode, or whose join is unresolved, is discarded on
/// its own. (disease, symptom) is the natural key: when the store returns the
/// pair more than once (one row per stage) the row with the highest
/// relevance is kept, the earliest on ties.
pub fn validate_rows(raw: Vec<serde_json::Value>) -> Vec<AssociationRow> {
    let total = raw.len();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut rows: Vec<AssociationRow> = Vec::with_capacity(total);
    let mut duplicates = 0usize;

    for value in raw {
        let r: RawAssociationRow = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Discarding malformed association row");
                continue;
            }
        };
        let key = (r.disease_id.clone(), r.symptom_id.clone());
        let Some(row) = r.validate() else {
            warn!(disease_id = ?key.0, symptom_id = ?key.1, "Discarding association row with unresolved join");
            continue;
        };

        let pair = (row.disease.id.clone(), row.symptom.id.clone());
        match index.get(&pair) {
            Some(&i) => {
                duplicates += 1;
                if row.relevance_score > rows[i].relevance_score {
                    rows[i] = row;
                }
            }
            None => {
                index.insert(pair, rows.len());
                rows.push(row);
            }
        }
    }

    if duplicates > 0 {
        debug!(duplicates, "Collapsed repeated (disease, symptom) rows");
    }
    let dropped = total - rows.len() - duplicates;
    if dropped > 0 {
        warn!(kept = rows.len(), dropped, "Association rows discarded at boundary");
    }
    rows
}

// =============================================================================
// Disease search
// =============================================================================

pub const MAX_PAGE_SIZE: usize = 100;

/// Disease search request. Pages are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub severity: Vec<SeverityLevel>,
    #[serde(default)]
    pub is_common: Option<bool>,
    #[serde(default)]
    pub is_emergency: Option<bool>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize { 1 }
fn default_page_size() -> usize { 20 }

impl DiseaseQuery {
    pub fn new(text: impl Into<String>, page: usize, page_size: usize) -> Self {
        Self {
            text: text.into(),
            page,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Page clamped to at least 1.
    pub fn effective_page(&self) -> usize {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.effective_page() - 1).saturating_mul(self.effective_page_size())
    }

    /// Trimmed, lower-cased search text.
    pub fn needle(&self) -> String {
        self.text.trim().to_lowercase()
    }

    /// Whether a disease passes every filter of this query.
    pub fn matches(&self, disease: &Disease) -> bool {
        let needle = self.needle();
        if !needle.is_empty() && !disease.matches_text(&needle) {
            return false;
        }
        if let Some(category) = &self.category_id {
            if disease.category_id.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if !self.severity.is_empty() && !self.severity.contains(&disease.severity_level) {
            return false;
        }
        if self.is_common.is_some_and(|c| c != disease.is_common) {
            return false;
        }
        if self.is_emergency.is_some_and(|e| e != disease.is_emergency) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePage {
    pub diseases: Vec<Disease>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub reachable: bool,
    pub rows: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub connected: bool,
    /// All core tables reachable and at least one holds data.
    pub initialized: bool,
    pub tables: BTreeMap<String, TableStatus>,
}

impl StoreHealth {
    pub fn from_tables(tables: BTreeMap<String, TableStatus>) -> Self {
        let connected = tables.values().any(|t| t.reachable);
        let initialized = !tables.is_empty()
            && tables.values().all(|t| t.reachable)
            && tables.values().any(|t| t.rows.unwrap_or(0) > 0);
        Self { connected, initialized, tables }
    }

    pub fn disconnected() -> Self {
        Self { connected: false, initialized: false, tables: BTreeMap::new() }
    }
}
