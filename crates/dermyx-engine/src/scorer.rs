//! Candidate disease scoring.
//!
//! Association rows are grouped per disease in first-appearance order and
//! turned into a confidence in [0, 100]. The formula depends on what the
//! catalog knows about each (disease, symptom) pair:
//!
//! - `WeightedMetadata`: relevance, frequency and diagnostic flags are known
//! - `SimpleRatio`: only the disease's symptom list is known
//!
//! Weighted mode:
//!
//!   symptom_score = severity_weight × relevance/100 × frequency/100 × d_row
//!   base          = min(Σ symptom_score × matched/requested × scale, 100)
//!   confidence    = round(min(base × d_disease × common, 100))
//!
//! where `d_row` applies to diagnostic rows, `d_disease` applies when any
//! matched row is diagnostic, and `common` applies to common conditions.

use std::collections::{HashMap, HashSet};

use dermyx_common::entities::{Disease, Symptom};
use dermyx_common::{ScoringConfig, TieBreak};
use dermyx_db::{AssociationData, AssociationRow, LinkedRow};
use serde::{Deserialize, Serialize};

use crate::normalise::{clamp_round_confidence, match_ratio, relative_scores, MAX_CONFIDENCE};

/// Which formula produced a candidate's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    WeightedMetadata,
    SimpleRatio,
}

impl ScoringStrategy {
    /// The strategy is fixed by the shape of the association data.
    pub fn for_data(data: &AssociationData) -> Self {
        match data {
            AssociationData::Weighted(_) => ScoringStrategy::WeightedMetadata,
            AssociationData::Linked(_) => ScoringStrategy::SimpleRatio,
        }
    }
}

/// One requested symptom that a candidate disease lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSymptom {
    pub symptom: Symptom,
    /// `None` under `SimpleRatio`, where pairwise metadata is unknown.
    pub relevance_score: Option<f64>,
    pub frequency_percentage: Option<f64>,
    pub is_diagnostic: bool,
    pub stage: Option<String>,
    /// This symptom's contribution to `total_score`.
    pub symptom_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisCandidate {
    pub disease: Disease,
    pub matched_symptoms: Vec<MatchedSymptom>,
    pub total_score: f64,
    /// Integer in [0, 100].
    pub confidence: u8,
    pub enhancement_factor: f64,
    pub strategy: ScoringStrategy,
    /// `total_score` over the strongest candidate's, denominator floored at 1.
    pub relative_score: f64,
    /// Ids of matched symptoms flagged diagnostic; filled in by enrichment.
    #[serde(default)]
    pub diagnostic_symptoms: Vec<String>,
}

impl DiagnosisCandidate {
    pub fn matched_count(&self) -> usize {
        self.matched_symptoms.len()
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

/// Score every disease present in `data` against `requested` distinct
/// symptom ids and return candidates sorted by confidence, highest first.
pub fn score_associations(
    data: &AssociationData,
    requested: usize,
    calibration: &ScoringConfig,
) -> Vec<DiagnosisCandidate> {
    if requested == 0 || data.is_empty() {
        return Vec::new();
    }

    let mut candidates = match data {
        AssociationData::Weighted(rows) => score_weighted(rows, requested, calibration),
        AssociationData::Linked(rows) => score_simple(rows, requested),
    };

    let totals: Vec<f64> = candidates.iter().map(|c| c.total_score).collect();
    for (candidate, relative) in candidates.iter_mut().zip(relative_scores(&totals)) {
        candidate.relative_score = relative;
    }

    sort_candidates(&mut candidates, calibration.tie_break);
    candidates
}

/// Confidence descending. `sort_by` is stable, so `Stable` keeps the
/// aggregation order among equal confidences.
pub fn sort_candidates(candidates: &mut [DiagnosisCandidate], tie_break: TieBreak) {
    match tie_break {
        TieBreak::Stable => candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence)),
        TieBreak::DiseaseId => candidates.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.disease.id.cmp(&b.disease.id))
        }),
    }
}

// ── Grouping ─────────────────────────────────────────────────────────────────

/// Group items by disease id, keeping first-appearance order. A symptom
/// repeated within one disease keeps its first row only.
fn group_by_disease<'a, T>(
    rows: &'a [T],
    disease_id: impl Fn(&T) -> &str,
    symptom_id: impl Fn(&T) -> &str,
) -> Vec<Vec<&'a T>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut groups: Vec<Vec<&T>> = Vec::new();
    for row in rows {
        let id = disease_id(row);
        if !seen.insert((id, symptom_id(row))) {
            continue;
        }
        match index.get(id) {
            Some(&i) => groups[i].push(row),
            None => {
                index.insert(id, groups.len());
                groups.push(vec![row]);
            }
        }
    }
    groups
}

// ── Weighted metadata ────────────────────────────────────────────────────────

fn symptom_score(row: &AssociationRow, calibration: &ScoringConfig) -> f64 {
    let bonus = if row.is_diagnostic { calibration.diagnostic_row_bonus } else { 1.0 };
    row.symptom.severity_weight
        * (row.relevance_score / 100.0)
        * (row.frequency_percentage / 100.0)
        * bonus
}

fn score_weighted(
    rows: &[AssociationRow],
    requested: usize,
    calibration: &ScoringConfig,
) -> Vec<DiagnosisCandidate> {
    group_by_disease(rows, |r| r.disease.id.as_str(), |r| r.symptom.id.as_str())
        .into_iter()
        .map(|group| {
            let disease = group[0].disease.clone();
            let matched_symptoms: Vec<MatchedSymptom> = group
                .iter()
                .map(|row| MatchedSymptom {
                    symptom: row.symptom.clone(),
                    relevance_score: Some(row.relevance_score),
                    frequency_percentage: Some(row.frequency_percentage),
                    is_diagnostic: row.is_diagnostic,
                    stage: row.stage.clone(),
                    symptom_score: symptom_score(row, calibration),
                })
                .collect();

            let total_score: f64 = matched_symptoms.iter().map(|m| m.symptom_score).sum();
            let has_diagnostic = matched_symptoms.iter().any(|m| m.is_diagnostic);

            let mut enhancement_factor = 1.0;
            if has_diagnostic {
                enhancement_factor *= calibration.diagnostic_disease_bonus;
            }
            if disease.is_common {
                enhancement_factor *= calibration.common_bonus;
            }

            let ratio = match_ratio(matched_symptoms.len(), requested);
            let base = (total_score * ratio * calibration.confidence_scale).min(MAX_CONFIDENCE);
            let confidence = clamp_round_confidence(base * enhancement_factor);

            DiagnosisCandidate {
                disease,
                matched_symptoms,
                total_score,
                confidence,
                enhancement_factor,
                strategy: ScoringStrategy::WeightedMetadata,
                relative_score: 0.0,
                diagnostic_symptoms: Vec::new(),
            }
        })
        .collect()
}

// ── Simple ratio ─────────────────────────────────────────────────────────────

fn score_simple(rows: &[LinkedRow], requested: usize) -> Vec<DiagnosisCandidate> {
    group_by_disease(rows, |r| r.disease.id.as_str(), |r| r.symptom.id.as_str())
        .into_iter()
        .map(|group| {
            let disease = group[0].disease.clone();
            let listed = group[0].disease_symptom_count;
            let matched_symptoms: Vec<MatchedSymptom> = group
                .iter()
                .map(|row| MatchedSymptom {
                    symptom: row.symptom.clone(),
                    relevance_score: None,
                    frequency_percentage: None,
                    is_diagnostic: false,
                    stage: None,
                    symptom_score: 1.0,
                })
                .collect();

            let score = match_ratio(matched_symptoms.len(), listed.max(requested));

            DiagnosisCandidate {
                disease,
                matched_symptoms,
                total_score: score,
                confidence: clamp_round_confidence(score * MAX_CONFIDENCE),
                enhancement_factor: 1.0,
                strategy: ScoringStrategy::SimpleRatio,
                relative_score: 0.0,
                diagnostic_symptoms: Vec::new(),
            }
        })
        .collect()
}
