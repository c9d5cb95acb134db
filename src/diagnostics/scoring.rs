//! Prediction quality scores

/// Mean absolute error; NaN for empty or mismatched input
pub fn mean_absolute_error(truth: &[f64], prediction: &[f64]) -> f64 {
    if truth.is_empty() || truth.len() != prediction.len() {
        return f64::NAN;
    }
    truth
        .iter()
        .zip(prediction)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / truth.len() as f64
}

/// Coefficient of determination R²
///
/// Constant truth scores 1.0 for a perfect prediction and 0.0 otherwise.
/// NaN for empty or mismatched input.
pub fn r2_score(truth: &[f64], prediction: &[f64]) -> f64 {
    if truth.is_empty() || truth.len() != prediction.len() {
        return f64::NAN;
    }
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_res: f64 = truth
        .iter()
        .zip(prediction)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
