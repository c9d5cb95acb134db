//! Synthetic data provider
//!
//! [`TestFunction`] samples labeled, candidate and evaluation points from a
//! bounded domain and labels them with a known target function. The
//! interpolation split is drawn inside the domain; the extrapolation split is
//! drawn in a margin around it.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use super::benchmarks::{FnTarget, SyntheticFunction};
use super::bounds::MultiBounds;
use super::dataset::{CandidateSet, LabeledSet, RowId};
use super::provider::{DataProvider, Dataset, EvaluationSplits};
use crate::error::DataError;

/// Options for generating a synthetic problem
#[derive(Clone, Debug, PartialEq)]
pub struct TestFunctionConfig {
    /// Number of initially labeled points
    pub initial_points: usize,
    /// Number of candidate points
    pub candidate_points: usize,
    /// Number of points in each evaluation split
    pub test_points: usize,
    /// Width of the extrapolation margin as a fraction of each range
    pub extrapolation_margin: f64,
    /// Standard deviation of Gaussian label noise (0 disables noise)
    ///
    /// Applies to the initial labeled rows and to candidate labels. The
    /// evaluation splits always hold exact target values.
    pub noise_std: f64,
    /// Produce a single holdout split instead of extrapolation/interpolation
    pub holdout: bool,
}

impl Default for TestFunctionConfig {
    fn default() -> Self {
        Self {
            initial_points: 20,
            candidate_points: 80,
            test_points: 100,
            extrapolation_margin: 0.25,
            noise_std: 0.0,
            holdout: false,
        }
    }
}

/// Builder for [`TestFunction`]
pub struct TestFunctionBuilder {
    config: TestFunctionConfig,
    target: Option<Arc<dyn SyntheticFunction>>,
    bounds: Option<MultiBounds>,
    seed: Option<u64>,
}

impl TestFunctionBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: TestFunctionConfig::default(),
            target: None,
            bounds: None,
            seed: None,
        }
    }

    /// Use a benchmark target; its domain is used unless bounds are set
    pub fn target<T: SyntheticFunction + 'static>(mut self, target: T) -> Self {
        self.target = Some(Arc::new(target));
        self
    }

    /// Use a closure as the target; requires [`bounds`](Self::bounds)
    pub fn function<F>(mut self, function: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let bounds = self.bounds.clone().unwrap_or_else(|| MultiBounds::new(vec![]));
        self.target = Some(Arc::new(FnTarget::new("function", bounds, function)));
        self
    }

    /// Set the sampling domain
    pub fn bounds(mut self, bounds: MultiBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the number of initially labeled points
    pub fn initial_points(mut self, n: usize) -> Self {
        self.config.initial_points = n;
        self
    }

    /// Set the number of candidate points
    pub fn candidate_points(mut self, n: usize) -> Self {
        self.config.candidate_points = n;
        self
    }

    /// Set the number of points in each evaluation split
    pub fn test_points(mut self, n: usize) -> Self {
        self.config.test_points = n;
        self
    }

    /// Set the extrapolation margin
    pub fn extrapolation_margin(mut self, fraction: f64) -> Self {
        self.config.extrapolation_margin = fraction;
        self
    }

    /// Set the label noise standard deviation
    ///
    /// Noise is added to the initial labeled rows and to the labels the
    /// provider returns for candidates. Interpolation, extrapolation and
    /// holdout rows are left noise-free so held-out scores measure the
    /// surrogate against the target itself.
    pub fn noise_std(mut self, std: f64) -> Self {
        self.config.noise_std = std;
        self
    }

    /// Produce a single holdout split
    pub fn holdout(mut self, enabled: bool) -> Self {
        self.config.holdout = enabled;
        self
    }

    /// Fix the generation seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: TestFunctionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sample the problem
    pub fn build(self) -> Result<TestFunction, DataError> {
        let target = self.target.ok_or_else(|| {
            DataError::InvalidConfiguration("a target function must be specified".to_string())
        })?;
        let bounds = match self.bounds {
            Some(b) => b,
            None => target.bounds(),
        };
        if bounds.dimension() == 0 {
            return Err(DataError::InvalidConfiguration(
                "bounds must be specified for a closure target".to_string(),
            ));
        }
        if self.config.noise_std < 0.0 || !self.config.noise_std.is_finite() {
            return Err(DataError::InvalidConfiguration(format!(
                "noise_std must be a non-negative number, got {}",
                self.config.noise_std
            )));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let noise = Normal::new(0.0, self.config.noise_std)
            .map_err(|e| DataError::InvalidConfiguration(e.to_string()))?;

        let label = |x: &[f64], rng: &mut StdRng| {
            let y = target.evaluate(x);
            if self.config.noise_std > 0.0 {
                y + noise.sample(rng)
            } else {
                y
            }
        };

        let draw = |n: usize, rng: &mut StdRng| -> Vec<(Vec<f64>, f64)> {
            (0..n)
                .map(|_| {
                    let x = bounds.sample(rng);
                    let y = label(&x, rng);
                    (x, y)
                })
                .collect()
        };

        let labeled = draw(self.config.initial_points, &mut rng);
        let candidates = draw(self.config.candidate_points, &mut rng);
        // Evaluation rows carry exact target values
        let interpolation: Vec<(Vec<f64>, f64)> = (0..self.config.test_points)
            .map(|_| {
                let x = bounds.sample(&mut rng);
                let y = target.evaluate(&x);
                (x, y)
            })
            .collect();

        // Test rows get identifiers past the labeled/candidate range
        let first_test = self.config.initial_points + self.config.candidate_points;
        let to_set = |rows: Vec<(Vec<f64>, f64)>, offset: usize| {
            LabeledSet::from_rows(
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| (RowId(offset + i), x, y)),
            )
        };

        let splits = if self.config.holdout {
            EvaluationSplits::Holdout(to_set(interpolation, first_test)?)
        } else {
            let extrapolation: Vec<(Vec<f64>, f64)> = (0..self.config.test_points)
                .map(|_| {
                    let x = bounds.sample_outside(self.config.extrapolation_margin, &mut rng);
                    let y = target.evaluate(&x);
                    (x, y)
                })
                .collect();
            EvaluationSplits::Split {
                extrapolation: to_set(extrapolation, first_test + self.config.test_points)?,
                interpolation: to_set(interpolation, first_test)?,
            }
        };

        Ok(TestFunction {
            name: target.name(),
            bounds,
            dataset: Dataset::new(labeled, candidates, splits)?,
        })
    }
}

impl Default for TestFunctionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A synthetic problem sampled from a known target function
#[derive(Clone, Debug)]
pub struct TestFunction {
    name: &'static str,
    bounds: MultiBounds,
    dataset: Dataset,
}

impl TestFunction {
    /// Create a builder
    pub fn builder() -> TestFunctionBuilder {
        TestFunctionBuilder::new()
    }

    /// Name of the target function
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Sampling domain
    pub fn bounds(&self) -> &MultiBounds {
        &self.bounds
    }
}

impl DataProvider for TestFunction {
    fn labeled_set(&self) -> &LabeledSet {
        self.dataset.labeled_set()
    }

    fn candidate_set(&self) -> &CandidateSet {
        self.dataset.candidate_set()
    }

    fn evaluation_splits(&self) -> &EvaluationSplits {
        self.dataset.evaluation_splits()
    }

    fn label(&self, id: RowId, features: &[f64]) -> Result<f64, DataError> {
        self.dataset.label(id, features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::benchmarks::Sphere;

    #[test]
    fn test_missing_function_is_rejected() {
        let err = TestFunction::builder().seed(1).build().unwrap_err();
        assert!(err.to_string().contains("target function"));
    }

    #[test]
    fn test_closure_without_bounds_is_rejected() {
        let err = TestFunction::builder()
            .function(|x: &[f64]| x[0])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("bounds"));
    }

    #[test]
    fn test_sizes_and_disjoint_ids() {
        let tf = TestFunction::builder()
            .target(Sphere::new(2))
            .initial_points(20)
            .candidate_points(80)
            .test_points(30)
            .seed(7)
            .build()
            .unwrap();

        assert_eq!(tf.labeled_set().len(), 20);
        assert_eq!(tf.candidate_set().len(), 80);
        for id in tf.candidate_set().ids() {
            assert!(!tf.labeled_set().contains(*id));
        }

        match tf.evaluation_splits() {
            EvaluationSplits::Split {
                extrapolation,
                interpolation,
            } => {
                assert_eq!(extrapolation.len(), 30);
                assert_eq!(interpolation.len(), 30);
                for x in extrapolation.features() {
                    assert!(!tf.bounds().contains_vec(x));
                }
                for x in interpolation.features() {
                    assert!(tf.bounds().contains_vec(x));
                }
            }
            EvaluationSplits::Holdout(_) => panic!("expected split evaluation sets"),
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let build = || {
            TestFunction::builder()
                .function(|x: &[f64]| x[0] * x[1])
                .bounds(MultiBounds::symmetric(1.0, 2))
                .holdout(true)
                .seed(11)
                .build()
                .unwrap()
        };
        let (a, b) = (build(), build());
        assert_eq!(a.labeled_set(), b.labeled_set());
        assert_eq!(a.candidate_set(), b.candidate_set());
        assert!(matches!(a.evaluation_splits(), EvaluationSplits::Holdout(_)));
    }

    #[test]
    fn test_noise_applies_to_labels_but_not_evaluation_rows() {
        let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
        let exact = |set: &LabeledSet| {
            set.features()
                .iter()
                .zip(set.outputs())
                .all(|(x, y)| (y - sphere(x)).abs() < 1e-12)
        };
        for holdout in [false, true] {
            let tf = TestFunction::builder()
                .target(Sphere::new(2))
                .noise_std(0.5)
                .holdout(holdout)
                .seed(5)
                .build()
                .unwrap();
            assert!(!exact(tf.labeled_set()));
            match tf.evaluation_splits() {
                EvaluationSplits::Split {
                    extrapolation,
                    interpolation,
                } => {
                    assert!(exact(extrapolation));
                    assert!(exact(interpolation));
                }
                EvaluationSplits::Holdout(rows) => assert!(exact(rows)),
            }
            let id = tf.candidate_set().ids()[0];
            let x = tf.candidate_set().get(id).unwrap().to_vec();
            assert!(tf.label(id, &x).unwrap().is_finite());
        }
    }

    #[test]
    fn test_label_returns_target_value() {
        let tf = TestFunction::builder()
            .target(Sphere::new(2))
            .seed(3)
            .build()
            .unwrap();
        let id = tf.candidate_set().ids()[0];
        let x = tf.candidate_set().get(id).unwrap().to_vec();
        let y = tf.label(id, &x).unwrap();
        assert!((y - (x[0] * x[0] + x[1] * x[1])).abs() < 1e-12);
    }
}
