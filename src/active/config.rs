//! Active-learning run configuration

use serde::{Deserialize, Serialize};

use crate::acquisition::config::{AcquisitionConfig, AcquisitionWeights};
use crate::error::{ActiveLearningError, AlResult};
use crate::selection::traits::SelectionConfig;
use crate::surrogate::traits::UnitHints;

/// Configuration for an active-learning run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveLearningConfig {
    /// Number of iterations
    pub iterations: usize,
    /// Rows promoted per iteration
    pub batch_size: usize,
    /// Criterion weights
    pub acquisition: AcquisitionWeights,
    /// Per-criterion options
    pub batch_config: AcquisitionConfig,
    /// Options forwarded to the batch selector
    pub selection: SelectionConfig,
    /// Roll back to the previous model when a new fit is worse
    pub regression_guard: bool,
    /// Unit of each feature
    pub feature_units: Option<Vec<String>>,
    /// Unit of the output
    pub output_units: Option<String>,
}

impl Default for ActiveLearningConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            batch_size: 5,
            acquisition: AcquisitionWeights::new().with("uncertainty", 1.0),
            batch_config: AcquisitionConfig::default(),
            selection: SelectionConfig::default(),
            regression_guard: true,
            feature_units: None,
            output_units: None,
        }
    }
}

impl ActiveLearningConfig {
    /// Set the number of iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the criterion weights
    pub fn with_acquisition(mut self, acquisition: AcquisitionWeights) -> Self {
        self.acquisition = acquisition;
        self
    }

    /// Set the per-criterion options
    pub fn with_batch_config(mut self, batch_config: AcquisitionConfig) -> Self {
        self.batch_config = batch_config;
        self
    }

    /// Set the selector options
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    /// Enable or disable the regression guard
    pub fn with_regression_guard(mut self, enabled: bool) -> Self {
        self.regression_guard = enabled;
        self
    }

    /// Set feature and output units
    pub fn with_units(mut self, features: Vec<String>, output: impl Into<String>) -> Self {
        self.feature_units = Some(features);
        self.output_units = Some(output.into());
        self
    }

    /// Unit hints for the surrogate; `None` unless both parts are set
    pub fn unit_hints(&self) -> Option<UnitHints> {
        UnitHints::from_parts(self.feature_units.as_deref(), self.output_units.as_deref())
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> AlResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ActiveLearningError::Configuration(format!("Failed to parse configuration: {}", e))
        })
    }

    /// Check values that would make every run fail
    pub fn validate(&self) -> AlResult<()> {
        if self.batch_size == 0 {
            return Err(ActiveLearningError::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if !(self.batch_config.difference.is_finite() && self.batch_config.difference > 0.0) {
            return Err(ActiveLearningError::Configuration(format!(
                "difference must be a positive finite step, got {}",
                self.batch_config.difference
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::config::DistanceMetric;

    #[test]
    fn test_defaults() {
        let config = ActiveLearningConfig::default();
        assert_eq!(config.acquisition.get("uncertainty"), Some(1.0));
        assert!(config.regression_guard);
        assert!(config.unit_hints().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_from_json() {
        let config = ActiveLearningConfig::from_json(
            r#"{
                "iterations": 3,
                "batch_size": 4,
                "acquisition": {"distance": 1.0, "uncertainty": 0.5},
                "batch_config": {"distance_metric": "chebyshev", "standard": true},
                "feature_units": ["m", "s"],
                "output_units": "J"
            }"#,
        )
        .unwrap();
        assert_eq!(config.iterations, 3);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.acquisition.get("distance"), Some(1.0));
        assert_eq!(config.batch_config.distance_metric, DistanceMetric::Chebyshev);
        assert!(config.batch_config.standard);
        assert_eq!(config.selection, SelectionConfig::default());
        assert_eq!(config.unit_hints().unwrap().output, "J");
    }

    #[test]
    fn test_bad_json_and_validation() {
        assert!(matches!(
            ActiveLearningConfig::from_json(r#"{"batch_config": {"distance_metric": "nope"}}"#),
            Err(ActiveLearningError::Configuration(_))
        ));
        assert!(ActiveLearningConfig::default().with_batch_size(0).validate().is_err());
        let mut config = ActiveLearningConfig::default();
        config.batch_config.difference = 0.0;
        assert!(config.validate().is_err());
    }
}
