//! Weighted combination of acquisition criteria

use std::sync::Arc;

use rand::RngCore;
use tracing::{debug, info};

use super::config::{AcquisitionConfig, AcquisitionWeights};
use super::criteria::{CriterionContext, CriterionFn, CriterionRegistry};
use super::gaussian::{NormalDistribution, StandardNormal};
use super::summary::ObjectiveSummary;
use crate::data::dataset::LabeledSet;
use crate::error::AcquisitionError;
use crate::surrogate::traits::SurrogateModel;

/// Scores candidate rows by a weighted sum of registered criteria
#[derive(Clone, Debug)]
pub struct AcquisitionEngine {
    registry: CriterionRegistry,
    normal: Arc<dyn NormalDistribution>,
}

impl AcquisitionEngine {
    /// Engine with every built-in criterion and the standard normal
    pub fn new() -> Self {
        Self {
            registry: CriterionRegistry::with_defaults(),
            normal: Arc::new(StandardNormal),
        }
    }

    /// Replace the criterion registry
    pub fn with_registry(mut self, registry: CriterionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the distribution used by the knowledge gradient
    pub fn with_normal(mut self, normal: Arc<dyn NormalDistribution>) -> Self {
        self.normal = normal;
        self
    }

    /// Register an additional criterion
    pub fn register(&mut self, name: impl Into<String>, criterion: CriterionFn) {
        self.registry.register(name, criterion);
    }

    /// Criterion registry
    pub fn registry(&self) -> &CriterionRegistry {
        &self.registry
    }

    /// One objective value per candidate row
    ///
    /// Sums `weight * criterion` over every name in `weights`. Names with no
    /// registered criterion contribute nothing.
    pub fn objective(
        &self,
        candidates: &[Vec<f64>],
        existing: &LabeledSet,
        surrogate: &dyn SurrogateModel,
        weights: &AcquisitionWeights,
        config: &AcquisitionConfig,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, AcquisitionError> {
        let ctx = CriterionContext {
            candidates,
            existing,
            surrogate,
            config,
            normal: self.normal.as_ref(),
        };

        let mut objective = vec![0.0; candidates.len()];
        for (name, weight) in weights.iter() {
            let Some(criterion) = self.registry.get(name) else {
                debug!(criterion = name, "ignoring unknown acquisition criterion");
                continue;
            };
            let values = criterion(&ctx, rng)?;
            if values.len() != candidates.len() {
                return Err(AcquisitionError::LengthMismatch {
                    name: name.to_string(),
                    expected: candidates.len(),
                    actual: values.len(),
                });
            }
            for (acc, v) in objective.iter_mut().zip(&values) {
                *acc += weight * v;
            }
        }

        if config.debug {
            let summary = ObjectiveSummary::from_values(&objective);
            info!(
                target: "symbal::acquisition",
                max = summary.max,
                min = summary.min,
                mean = summary.mean,
                std = summary.std,
                "{}",
                summary
            );
        }

        Ok(objective)
    }
}

impl Default for AcquisitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Score candidates with the built-in criteria
pub fn objective(
    candidates: &[Vec<f64>],
    existing: &LabeledSet,
    surrogate: &dyn SurrogateModel,
    weights: &AcquisitionWeights,
    config: &AcquisitionConfig,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    AcquisitionEngine::new().objective(candidates, existing, surrogate, weights, config, rng)
}
