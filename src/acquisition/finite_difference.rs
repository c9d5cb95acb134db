//! Finite-difference derivatives of surrogate members
//!
//! Each function evaluates one ensemble member (or the best member when
//! `member` is `None`) on shifted copies of the candidate matrix, one batch
//! prediction per feature axis.

use crate::error::SurrogateError;
use crate::surrogate::traits::SurrogateModel;

fn shifted(rows: &[Vec<f64>], axis: usize, delta: f64) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            row[axis] += delta;
            row
        })
        .collect()
}

fn dimension(rows: &[Vec<f64>]) -> usize {
    rows.first().map_or(0, Vec::len)
}

/// Per-row magnitude of the forward-difference gradient
///
/// `(f(x + h e_k) - f(x)) / h` for every axis k, combined by Euclidean norm.
pub fn gradient_magnitude(
    surrogate: &dyn SurrogateModel,
    rows: &[Vec<f64>],
    member: Option<usize>,
    step: f64,
) -> Result<Vec<f64>, SurrogateError> {
    let base = surrogate.predict(rows, member)?;
    let mut sum_sq = vec![0.0; rows.len()];
    for axis in 0..dimension(rows) {
        let forward = surrogate.predict(&shifted(rows, axis, step), member)?;
        for ((acc, f1), f0) in sum_sq.iter_mut().zip(&forward).zip(&base) {
            *acc += ((f1 - f0) / step).powi(2);
        }
    }
    Ok(sum_sq.into_iter().map(f64::sqrt).collect())
}

/// Per-row magnitude of the central second difference
///
/// `(f(x + h e_k) - 2 f(x) + f(x - h e_k)) / h²` for every axis k, combined by
/// Euclidean norm. The step along axis k is `sqrt(step) * max(1, |x_k|)`: the
/// division by `h²` needs a much wider step than the forward difference, and
/// the relative scaling keeps it above roundoff for large coordinates.
pub fn curvature_magnitude(
    surrogate: &dyn SurrogateModel,
    rows: &[Vec<f64>],
    member: Option<usize>,
    step: f64,
) -> Result<Vec<f64>, SurrogateError> {
    let base = surrogate.predict(rows, member)?;
    let root = step.sqrt();
    let mut sum_sq = vec![0.0; rows.len()];
    for axis in 0..dimension(rows) {
        let h: Vec<f64> = rows.iter().map(|row| root * row[axis].abs().max(1.0)).collect();
        let offset = |sign: f64| -> Vec<Vec<f64>> {
            rows.iter()
                .zip(&h)
                .map(|(row, h)| {
                    let mut row = row.clone();
                    row[axis] += sign * h;
                    row
                })
                .collect()
        };
        let forward = surrogate.predict(&offset(1.0), member)?;
        let backward = surrogate.predict(&offset(-1.0), member)?;
        for (i, acc) in sum_sq.iter_mut().enumerate() {
            *acc += ((forward[i] - 2.0 * base[i] + backward[i]) / (h[i] * h[i])).powi(2);
        }
    }
    Ok(sum_sq.into_iter().map(f64::sqrt).collect())
}

/// Signed difference between a member's prediction and the best member's
pub fn disagreement(
    surrogate: &dyn SurrogateModel,
    rows: &[Vec<f64>],
    member: usize,
    best: &[f64],
) -> Result<Vec<f64>, SurrogateError> {
    let prediction = surrogate.predict(rows, Some(member))?;
    Ok(prediction.iter().zip(best).map(|(p, b)| p - b).collect())
}
