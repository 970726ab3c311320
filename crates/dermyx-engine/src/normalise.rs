//! Score normalisation functions.

/// Upper bound of every confidence value.
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Clamp a raw confidence into [0, 100] and round to the nearest integer.
/// Non-finite input maps to 0.
pub fn clamp_round_confidence(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.clamp(0.0, MAX_CONFIDENCE).round() as u8
}

/// Fraction of the requested symptoms a disease matched.
/// Zero requested gives 0 rather than a division fault.
pub fn match_ratio(matched: usize, requested: usize) -> f64 {
    if requested == 0 {
        return 0.0;
    }
    matched as f64 / requested as f64
}

/// Each score divided by the largest one, the denominator floored at 1.
///
/// With every score at zero the result is all zeros.
/// Returns normalised scores in the same order as input.
pub fn relative_scores(totals: &[f64]) -> Vec<f64> {
    let max = totals
        .iter()
        .copied()
        .filter(|t| t.is_finite())
        .fold(0.0f64, f64::max);
    let denominator = max.max(1.0);
    totals.iter().map(|&t| (t / denominator).clamp(0.0, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped_and_rounded() {
        assert_eq!(clamp_round_confidence(39.26), 39);
        assert_eq!(clamp_round_confidence(43.186), 43);
        assert_eq!(clamp_round_confidence(49.5), 50);
        assert_eq!(clamp_round_confidence(250.0), 100);
        assert_eq!(clamp_round_confidence(-3.0), 0);
        assert_eq!(clamp_round_confidence(f64::NAN), 0);
    }

    #[test]
    fn test_match_ratio() {
        assert!((match_ratio(2, 4) - 0.5).abs() < 1e-12);
        assert_eq!(match_ratio(3, 0), 0.0);
    }

    #[test]
    fn test_relative_scores() {
        let r = relative_scores(&[3.0, 1.5, 0.0]);
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!((r[1] - 0.5).abs() < 1e-12);
        assert_eq!(r[2], 0.0);
    }

    #[test]
    fn test_all_zero_totals_stay_zero() {
        assert_eq!(relative_scores(&[0.0, 0.0]), vec![0.0, 0.0]);
        // Small maxima are not blown up to 1.0.
        let r = relative_scores(&[0.5, 0.25]);
        assert!((r[0] - 0.5).abs() < 1e-12);
        assert!(relative_scores(&[]).is_empty());
    }
}
