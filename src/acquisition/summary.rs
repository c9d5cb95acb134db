//! Summary statistics of a combined objective

use std::fmt;

use serde::{Deserialize, Serialize};

/// Running mean, variance and extrema (Welford's online algorithm)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl RunningStats {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observation
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Number of observations
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean (NaN when empty)
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Population variance (NaN when empty)
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for v in iter {
            stats.update(v);
        }
        stats
    }
}

/// Max, min, mean and population std of an objective array
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSummary {
    /// Largest value
    pub max: f64,
    /// Smallest value
    pub min: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

impl ObjectiveSummary {
    /// Summarize values; all fields are NaN for an empty slice
    pub fn from_values(values: &[f64]) -> Self {
        let stats: RunningStats = values.iter().copied().collect();
        Self::from(&stats)
    }
}

impl From<&RunningStats> for ObjectiveSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            max: stats.max.unwrap_or(f64::NAN),
            min: stats.min.unwrap_or(f64::NAN),
            mean: stats.mean(),
            std: stats.population_variance().sqrt(),
        }
    }
}

impl fmt::Display for ObjectiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max: {}, min: {}, avg: {}, std: {}",
            self.max, self.min, self.mean, self.std
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary() {
        let s = ObjectiveSummary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.min, 2.0);
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std, 2.0);
        assert!(s.to_string().starts_with("max: 9, min: 2"));
    }

    #[test]
    fn test_empty_summary_is_nan() {
        let s = ObjectiveSummary::from_values(&[]);
        assert!(s.max.is_nan() && s.mean.is_nan() && s.std.is_nan());
    }

    #[test]
    fn test_running_stats_accumulate_incrementally() {
        let mut stats = RunningStats::new();
        assert_eq!(stats.count(), 0);
        assert!(stats.mean().is_nan());
        for v in [1.0, 2.0, 3.0, 10.0, -4.0] {
            stats.update(v);
        }
        assert_eq!(stats.count(), 5);
        assert_relative_eq!(stats.mean(), 2.4, epsilon = 1e-12);
        assert_relative_eq!(stats.population_variance(), 20.24, epsilon = 1e-12);
    }
}
