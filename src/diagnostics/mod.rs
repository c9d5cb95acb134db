//! Diagnostics and statistics
//!
//! Per-iteration metrics of an active-learning run, the accumulated selector
//! penalty audit, and the quality scores they are built from.

pub(crate) mod nan_as_null;
pub mod penalties;
pub mod scoring;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Held-out quality of the best member
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum HeldOutScores {
    /// R² on the extrapolation and interpolation sets
    Split {
        #[serde(with = "nan_as_null")]
        extrapolation: f64,
        #[serde(with = "nan_as_null")]
        interpolation: f64,
    },
    /// R² on a single holdout set
    Holdout(#[serde(with = "nan_as_null")] f64),
}

impl fmt::Display for HeldOutScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Split {
                extrapolation,
                interpolation,
            } => write!(f, "extrap {:.4}, interp {:.4}", extrapolation, interpolation),
            Self::Holdout(score) => write!(f, "holdout {:.4}", score),
        }
    }
}

/// Timing statistics for one iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent fitting the surrogate (ms)
    pub fit_ms: f64,
    /// Time spent scoring candidates (ms)
    pub acquisition_ms: f64,
    /// Time spent in the batch selector (ms)
    pub selection_ms: f64,
    /// Total iteration time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    /// Create new timing stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fit time
    pub fn with_fit(mut self, duration: Duration) -> Self {
        self.fit_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set acquisition time
    pub fn with_acquisition(mut self, duration: Duration) -> Self {
        self.acquisition_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set selection time
    pub fn with_selection(mut self, duration: Duration) -> Self {
        self.selection_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set total time
    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

/// Metrics recorded for one iteration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationMetrics {
    /// Iteration index (0-based)
    pub iteration: usize,
    /// Formula of the best member
    pub formula: String,
    /// Held-out R² of the best member
    pub held_out: HeldOutScores,
    /// R² of the best member on the labeled set
    #[serde(with = "nan_as_null")]
    pub existing_score: f64,
    /// Loss of the best member
    #[serde(with = "nan_as_null")]
    pub loss: f64,
    /// Score of the best member
    #[serde(with = "nan_as_null")]
    pub score: f64,
    /// Loss of the secondary (lowest-loss) member
    #[serde(with = "nan_as_null")]
    pub loss_other: f64,
    /// Score of the secondary member
    #[serde(with = "nan_as_null")]
    pub score_other: f64,
    /// The new fit was discarded in favour of the previous model
    pub rolled_back: bool,
    /// Guard MAE of the previous model, when there was one
    pub previous_mae: Option<f64>,
    /// Guard MAE of the new fit, when there was a previous model
    pub current_mae: Option<f64>,
    /// Timing information
    pub timing: TimingStats,
}

/// Metrics for a whole run, one row per iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    rows: Vec<IterationMetrics>,
}

impl MetricsTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an iteration's metrics
    pub fn record(&mut self, metrics: IterationMetrics) {
        self.rows.push(metrics);
    }

    /// All rows in iteration order
    pub fn rows(&self) -> &[IterationMetrics] {
        &self.rows
    }

    /// Number of recorded iterations
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row
    pub fn last(&self) -> Option<&IterationMetrics> {
        self.rows.last()
    }

    /// History of best formulas
    pub fn formula_history(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.formula.as_str()).collect()
    }

    /// History of best-member losses
    pub fn loss_history(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.loss).collect()
    }

    /// History of best-member scores
    pub fn score_history(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.score).collect()
    }

    /// History of labeled-set R²
    pub fn existing_score_history(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.existing_score).collect()
    }

    /// History of held-out scores
    pub fn held_out_history(&self) -> Vec<HeldOutScores> {
        self.rows.iter().map(|r| r.held_out).collect()
    }

    /// Iterations on which the guard rolled back
    pub fn rollbacks(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|r| r.rolled_back)
            .map(|r| r.iteration)
            .collect()
    }

    /// Summary of the run
    pub fn summary(&self) -> String {
        let total_ms: f64 = self.rows.iter().map(|r| r.timing.total_ms).sum();
        match self.last() {
            Some(last) => format!(
                "Active Learning Summary:\n\
                 - Iterations: {}\n\
                 - Rollbacks: {}\n\
                 - Final formula: {}\n\
                 - Final loss: {:.6}\n\
                 - Final held-out: {}\n\
                 - Runtime: {:.2}ms",
                self.len(),
                self.rollbacks().len(),
                last.formula,
                last.loss,
                last.held_out,
                total_ms
            ),
            None => "Active Learning Summary:\n- Iterations: 0".to_string(),
        }
    }
}

pub mod prelude {
    pub use super::penalties::PenaltyAudit;
    pub use super::scoring::{mean_absolute_error, r2_score};
    pub use super::{HeldOutScores, IterationMetrics, MetricsTable, TimingStats};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(iteration: usize, rolled_back: bool) -> IterationMetrics {
        IterationMetrics {
            iteration,
            formula: format!("{} + x0", iteration),
            held_out: HeldOutScores::Holdout(0.5 + iteration as f64 / 10.0),
            existing_score: 0.9,
            loss: 1.0 / (iteration + 1) as f64,
            score: 0.8,
            loss_other: 0.1,
            score_other: 0.7,
            rolled_back,
            previous_mae: None,
            current_mae: None,
            timing: TimingStats::new().with_total(Duration::from_millis(10)),
        }
    }

    #[test]
    fn test_metrics_table_history() {
        let mut table = MetricsTable::new();
        for i in 0..3 {
            table.record(row(i, i == 1));
        }
        assert_eq!(table.len(), 3);
        assert_eq!(table.loss_history(), vec![1.0, 0.5, 1.0 / 3.0]);
        assert_eq!(table.formula_history()[2], "2 + x0");
        assert_eq!(table.rollbacks(), vec![1]);
        assert_eq!(table.held_out_history()[0], HeldOutScores::Holdout(0.5));
    }

    #[test]
    fn test_summary() {
        let mut table = MetricsTable::new();
        assert!(table.summary().contains("Iterations: 0"));
        table.record(row(0, false));
        let summary = table.summary();
        assert!(summary.contains("Iterations: 1"));
        assert!(summary.contains("Final formula: 0 + x0"));
        assert!(summary.contains("holdout 0.5000"));
    }

    #[test]
    fn test_timing_stats() {
        let timing = TimingStats::new()
            .with_fit(Duration::from_millis(100))
            .with_acquisition(Duration::from_millis(20))
            .with_selection(Duration::from_millis(5))
            .with_total(Duration::from_millis(130));
        assert!((timing.fit_ms - 100.0).abs() < 0.1);
        assert!((timing.acquisition_ms - 20.0).abs() < 0.1);
        assert!((timing.selection_ms - 5.0).abs() < 0.1);
        assert!((timing.total_ms - 130.0).abs() < 0.1);
    }

    #[test]
    fn test_metrics_json_keeps_nan_scores() {
        let mut metrics = row(0, true);
        metrics.score = f64::NAN;
        metrics.held_out = HeldOutScores::Holdout(f64::NAN);
        let json = serde_json::to_string(&metrics).unwrap();
        let back: IterationMetrics = serde_json::from_str(&json).unwrap();
        assert!(back.rolled_back);
        assert!(back.score.is_nan());
        assert!(matches!(back.held_out, HeldOutScores::Holdout(v) if v.is_nan()));
        assert_eq!(back.loss, metrics.loss);
    }
}
