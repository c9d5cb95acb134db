//! Normalization of criterion arrays and feature columns
//!
//! Degenerate inputs are handled here rather than left to produce NaN: an
//! array with zero (or non-finite) spread rescales to all zeros, and a
//! feature column with zero range keeps a unit denominator.

/// Min-max rescale to [0, 1]; zero or non-finite range yields all zeros
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - lo) / range).collect()
}

/// Z-score with the population standard deviation; zero or non-finite
/// spread yields all zeros
pub fn z_score(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if !std.is_finite() || std <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Rescale a criterion array to [0, 1]
///
/// With `standard` the array is z-scored first. The min-max step is what
/// bounds the result; z-scoring only changes behaviour for degenerate input.
pub fn scale_objective(values: &[f64], standard: bool) -> Vec<f64> {
    if standard {
        min_max(&z_score(values))
    } else {
        min_max(values)
    }
}

/// Per-feature offset and scale taken from a reference matrix
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRange {
    min: Vec<f64>,
    span: Vec<f64>,
}

impl FeatureRange {
    /// Column minima and ranges of `rows`; zero-range columns get span 1
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let dimension = rows.first().map_or(0, Vec::len);
        let mut min = vec![f64::INFINITY; dimension];
        let mut max = vec![f64::NEG_INFINITY; dimension];
        for row in rows {
            for (k, &v) in row.iter().enumerate().take(dimension) {
                min[k] = min[k].min(v);
                max[k] = max[k].max(v);
            }
        }
        let span = min
            .iter()
            .zip(&max)
            .map(|(lo, hi)| {
                let r = hi - lo;
                if r.is_finite() && r > 0.0 {
                    r
                } else {
                    1.0
                }
            })
            .collect();
        Self { min, span }
    }

    /// Apply `(x - min) / span` column-wise
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.min.iter().zip(&self.span))
                    .map(|(v, (lo, s))| (v - lo) / s)
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_min_max_bounds() {
        let scaled = min_max(&[3.0, 1.0, 2.0, 5.0]);
        assert_eq!(scaled, vec![0.5, 0.0, 0.25, 1.0]);
    }

    #[test]
    fn test_min_max_zero_range_is_all_zero() {
        assert_eq!(min_max(&[2.0, 2.0, 2.0]), vec![0.0; 3]);
        assert!(min_max(&[]).is_empty());
    }

    #[test]
    fn test_min_max_infinite_range_is_all_zero() {
        assert_eq!(min_max(&[0.0, f64::INFINITY]), vec![0.0; 2]);
    }

    #[test]
    fn test_z_score() {
        let z = z_score(&[1.0, 2.0, 3.0]);
        let expected = 1.0 / (2.0f64 / 3.0).sqrt();
        assert_relative_eq!(z[0], -expected, epsilon = 1e-12);
        assert_relative_eq!(z[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(z[2], expected, epsilon = 1e-12);
        assert_eq!(z_score(&[4.0, 4.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_scale_objective_standard_and_plain_agree_on_order() {
        let values = [0.3, 9.0, -2.0, 4.5];
        let plain = scale_objective(&values, false);
        let standard = scale_objective(&values, true);
        for (a, b) in plain.iter().zip(&standard) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
        assert_eq!(scale_objective(&[1.0, 1.0], true), vec![0.0, 0.0]);
    }

    #[test]
    fn test_feature_range_guards_constant_column() {
        let reference = vec![vec![0.0, 5.0], vec![10.0, 5.0]];
        let range = FeatureRange::fit(&reference);
        let scaled = range.transform(&[vec![5.0, 5.0], vec![20.0, 7.0]]);
        assert_eq!(scaled[0], vec![0.5, 0.0]);
        assert_eq!(scaled[1], vec![2.0, 2.0]);
    }
}
