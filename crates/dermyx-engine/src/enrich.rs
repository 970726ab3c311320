//! Result enrichment.
//!
//! Scored candidates already carry full disease and symptom records. This
//! pass derives the display fields; it never touches scores or order.

use crate::scorer::DiagnosisCandidate;

/// Fill `diagnostic_symptoms` on every candidate.
pub fn enrich(candidates: &mut [DiagnosisCandidate]) {
    for candidate in candidates.iter_mut() {
        candidate.diagnostic_symptoms = candidate
            .matched_symptoms
            .iter()
            .filter(|m| m.is_diagnostic)
            .map(|m| m.symptom.id.clone())
            .collect();
    }
}
