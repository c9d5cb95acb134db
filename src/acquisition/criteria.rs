//! Acquisition criteria
//!
//! Every criterion is a pure function of a [`CriterionContext`] (plus an RNG
//! for the noise criteria) returning one value per candidate row. Criteria
//! are looked up by name in a [`CriterionRegistry`].
//!
//! | Name | Value |
//! |---|---|
//! | `gradient` / `curvature` | finite-difference magnitude summed over members |
//! | `grad1` / `curv1` | the same for the best member only |
//! | `uncertainty` / `certainty` | member disagreement with the best member, and its negation |
//! | `distance` / `proximity` | minimum distance to the existing set, and its negation |
//! | `density` / `sparsity` | mean distance to the existing set, and its negation |
//! | `random` / `rand1` | uniform noise in [0, 1), min-max scaled normal noise |
//! | `gaussian_unc` / `know_grad` | Gaussian-process std, knowledge gradient |

use std::collections::BTreeMap;
use std::fmt;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::AcquisitionConfig;
use super::finite_difference::{curvature_magnitude, disagreement, gradient_magnitude};
use super::gaussian::{
    FeatureScaler, GaussianProcess, GaussianSurrogate, NormalDistribution, StandardScaler,
};
use super::normalize::{min_max, scale_objective, FeatureRange};
use crate::data::dataset::LabeledSet;
use crate::error::AcquisitionError;
use crate::surrogate::traits::SurrogateModel;

/// Inputs shared by all criteria for one scoring call
#[derive(Clone, Copy)]
pub struct CriterionContext<'a> {
    /// Candidate feature rows
    pub candidates: &'a [Vec<f64>],
    /// Existing labeled set
    pub existing: &'a LabeledSet,
    /// Fitted surrogate
    pub surrogate: &'a dyn SurrogateModel,
    /// Per-criterion options
    pub config: &'a AcquisitionConfig,
    /// Distribution for the knowledge gradient
    pub normal: &'a dyn NormalDistribution,
}

impl CriterionContext<'_> {
    fn check_existing(&self, criterion: &'static str) -> Result<(), AcquisitionError> {
        if self.existing.is_empty() {
            return Err(AcquisitionError::EmptyExisting(criterion));
        }
        let expected = self.existing.dimension().unwrap_or(0);
        match self.candidates.iter().find(|row| row.len() != expected) {
            Some(row) => Err(AcquisitionError::DimensionMismatch {
                expected,
                actual: row.len(),
            }),
            None => Ok(()),
        }
    }

    fn member_weight(&self, member: usize) -> f64 {
        if self.config.score_reg {
            self.surrogate
                .ensemble()
                .get(member)
                .map_or(1.0, |m| m.score)
        } else {
            1.0
        }
    }
}

/// Signature of a registered criterion
pub type CriterionFn =
    fn(&CriterionContext<'_>, &mut dyn RngCore) -> Result<Vec<f64>, AcquisitionError>;

/// Name → criterion lookup table
#[derive(Clone)]
pub struct CriterionRegistry {
    criteria: BTreeMap<String, CriterionFn>,
}

impl CriterionRegistry {
    /// Registry with no criteria
    pub fn empty() -> Self {
        Self {
            criteria: BTreeMap::new(),
        }
    }

    /// Registry with every built-in criterion
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("gradient", gradient);
        registry.register("curvature", curvature);
        registry.register("distance", distance);
        registry.register("proximity", proximity);
        registry.register("density", density);
        registry.register("sparsity", sparsity);
        registry.register("uncertainty", uncertainty);
        registry.register("certainty", certainty);
        registry.register("random", random);
        registry.register("rand1", rand1);
        registry.register("grad1", grad1);
        registry.register("curv1", curv1);
        registry.register("gaussian_unc", gaussian_unc);
        registry.register("know_grad", know_grad);
        registry
    }

    /// Add or replace a criterion
    pub fn register(&mut self, name: impl Into<String>, criterion: CriterionFn) {
        self.criteria.insert(name.into(), criterion);
    }

    /// Look up a criterion
    pub fn get(&self, name: &str) -> Option<CriterionFn> {
        self.criteria.get(name).copied()
    }

    /// Check if a criterion is registered
    pub fn contains(&self, name: &str) -> bool {
        self.criteria.contains_key(name)
    }

    /// Registered names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.criteria.keys().map(String::as_str)
    }
}

impl fmt::Debug for CriterionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.criteria.keys()).finish()
    }
}

impl Default for CriterionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn sum_abs_over_members<F>(
    ctx: &CriterionContext<'_>,
    mut per_member: F,
) -> Result<Vec<f64>, AcquisitionError>
where
    F: FnMut(usize) -> Result<Vec<f64>, AcquisitionError>,
{
    let mut total = vec![0.0; ctx.candidates.len()];
    for member in 0..ctx.surrogate.ensemble().len() {
        let weight = ctx.member_weight(member);
        for (acc, v) in total.iter_mut().zip(per_member(member)?) {
            *acc += (v * weight).abs();
        }
    }
    Ok(total)
}

/// Finite-difference gradient summed over ensemble members
pub fn gradient(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let step = ctx.config.difference;
    let total = sum_abs_over_members(ctx, |m| {
        Ok(gradient_magnitude(ctx.surrogate, ctx.candidates, Some(m), step)?)
    })?;
    Ok(scale_objective(&total, ctx.config.standard))
}

/// Finite-difference curvature summed over ensemble members
pub fn curvature(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let step = ctx.config.difference;
    let total = sum_abs_over_members(ctx, |m| {
        Ok(curvature_magnitude(ctx.surrogate, ctx.candidates, Some(m), step)?)
    })?;
    Ok(scale_objective(&total, ctx.config.standard))
}

/// Gradient of the best member
pub fn grad1(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let g = gradient_magnitude(ctx.surrogate, ctx.candidates, None, ctx.config.difference)?;
    Ok(scale_objective(&g, ctx.config.standard))
}

/// Curvature of the best member
pub fn curv1(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let c = curvature_magnitude(ctx.surrogate, ctx.candidates, None, ctx.config.difference)?;
    Ok(scale_objective(&c, ctx.config.standard))
}

/// Disagreement of every member with the best member
pub fn uncertainty(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let best = ctx.surrogate.predict(ctx.candidates, None)?;
    let total = sum_abs_over_members(ctx, |m| {
        Ok(disagreement(ctx.surrogate, ctx.candidates, m, &best)?)
    })?;
    Ok(scale_objective(&total, ctx.config.standard))
}

/// Negated uncertainty
pub fn certainty(
    ctx: &CriterionContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    Ok(negate(uncertainty(ctx, rng)?))
}

/// Candidate × existing distance rows, both sets scaled by the candidate range
fn distance_rows<R>(
    ctx: &CriterionContext<'_>,
    criterion: &'static str,
    reduce: R,
) -> Result<Vec<f64>, AcquisitionError>
where
    R: Fn(&[f64]) -> f64 + Sync,
{
    ctx.check_existing(criterion)?;
    let range = FeatureRange::fit(ctx.candidates);
    let candidates = range.transform(ctx.candidates);
    let existing = range.transform(ctx.existing.features());
    let metric = ctx.config.distance_metric;
    let row = |c: &Vec<f64>| -> f64 {
        let d: Vec<f64> = existing.iter().map(|e| metric.distance(c, e)).collect();
        reduce(&d)
    };

    #[cfg(feature = "parallel")]
    if ctx.config.parallel {
        return Ok(candidates.par_iter().map(row).collect());
    }
    Ok(candidates.iter().map(row).collect())
}

/// Smallest distance; NaN if any distance is NaN
fn min_of(d: &[f64]) -> f64 {
    d.iter().copied().fold(f64::INFINITY, |acc, v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            acc.min(v)
        }
    })
}

fn mean_of(d: &[f64]) -> f64 {
    d.iter().sum::<f64>() / d.len() as f64
}

/// Minimum distance to any existing point
pub fn distance(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    distance_rows(ctx, "distance", min_of)
}

/// Negated distance
pub fn proximity(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    Ok(negate(distance_rows(ctx, "proximity", min_of)?))
}

/// Mean distance to all existing points
pub fn density(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    distance_rows(ctx, "density", mean_of)
}

/// Negated density
pub fn sparsity(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    Ok(negate(distance_rows(ctx, "sparsity", mean_of)?))
}

/// Uniform noise in [0, 1), not rescaled
pub fn random(
    ctx: &CriterionContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    Ok((0..ctx.candidates.len()).map(|_| rng.gen::<f64>()).collect())
}

/// Standard normal noise, min-max scaled
pub fn rand1(
    ctx: &CriterionContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let noise: Vec<f64> = (0..ctx.candidates.len())
        .map(|_| -> f64 { StandardNormal.sample(&mut *rng) })
        .collect();
    Ok(min_max(&noise))
}

/// Fit the configured Gaussian surrogate on the standardized existing set
fn gaussian_fit(
    ctx: &CriterionContext<'_>,
    criterion: &'static str,
) -> Result<(Vec<f64>, Vec<f64>), AcquisitionError> {
    ctx.check_existing(criterion)?;
    let transform = match &ctx.config.scaler {
        Some(scaler) => scaler.fit(ctx.existing.features()),
        None => StandardScaler.fit(ctx.existing.features()),
    };
    let existing = transform.transform(ctx.existing.features());
    let candidates = transform.transform(ctx.candidates);
    let posterior = match &ctx.config.gpr {
        Some(gpr) => gpr.fit(&existing, ctx.existing.outputs())?,
        None => GaussianProcess::default().fit(&existing, ctx.existing.outputs())?,
    };
    let (mean, std) = posterior.predict(&candidates)?;
    if mean.len() != candidates.len() || std.len() != candidates.len() {
        return Err(AcquisitionError::Gaussian(format!(
            "posterior returned {} means and {} stds for {} rows",
            mean.len(),
            std.len(),
            candidates.len()
        )));
    }
    Ok((mean, std))
}

/// Gaussian-process predictive standard deviation
pub fn gaussian_unc(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let (_, std) = gaussian_fit(ctx, "gaussian_unc")?;
    Ok(scale_objective(&std, ctx.config.standard))
}

/// Knowledge gradient `σ Φ(z) + φ(z)` with `z = (μ - max y) / σ`
///
/// Rows with zero predictive std contribute exactly zero.
pub fn know_grad(
    ctx: &CriterionContext<'_>,
    _rng: &mut dyn RngCore,
) -> Result<Vec<f64>, AcquisitionError> {
    let (mean, std) = gaussian_fit(ctx, "know_grad")?;
    let best = ctx.existing.max_output().unwrap_or(f64::NEG_INFINITY);
    let values: Vec<f64> = mean
        .iter()
        .zip(&std)
        .map(|(&mu, &sigma)| {
            if sigma == 0.0 {
                return 0.0;
            }
            let z = (mu - best) / sigma;
            sigma * ctx.normal.cdf(z) + ctx.normal.pdf(z)
        })
        .collect();
    Ok(scale_objective(&values, ctx.config.standard))
}

fn negate(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|v| -v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::config::DistanceMetric;
    use crate::acquisition::finite_difference::tests::QuadraticSurrogate;
    use crate::acquisition::gaussian::{GaussianPosterior, StandardNormal};
    use crate::data::dataset::RowId;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn existing(rows: &[(Vec<f64>, f64)]) -> LabeledSet {
        LabeledSet::from_rows(
            rows.iter()
                .enumerate()
                .map(|(i, (x, y))| (RowId(i), x.clone(), *y)),
        )
        .unwrap()
    }

    fn run(
        criterion: CriterionFn,
        candidates: &[Vec<f64>],
        existing: &LabeledSet,
        config: &AcquisitionConfig,
    ) -> Result<Vec<f64>, AcquisitionError> {
        let model = QuadraticSurrogate::new(3, 0);
        let ctx = CriterionContext {
            candidates,
            existing,
            surrogate: &model,
            config,
            normal: &StandardNormal,
        };
        criterion(&ctx, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_registry_defaults() {
        let registry = CriterionRegistry::with_defaults();
        assert_eq!(registry.names().count(), 14);
        assert!(registry.contains("know_grad"));
        assert!(registry.get("nonsense").is_none());
    }

    #[test]
    fn test_normalized_criteria_in_unit_interval() {
        let candidates: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64 * 0.3, 1.0]).collect();
        let set = existing(&[(vec![0.0, 0.0], 0.0), (vec![1.0, 2.0], 1.0)]);
        let config = AcquisitionConfig::default().with_difference(1e-4);
        let normalized: [CriterionFn; 8] = [
            gradient,
            curvature,
            grad1,
            curv1,
            uncertainty,
            rand1,
            gaussian_unc,
            know_grad,
        ];
        for criterion in normalized {
            let values = run(criterion, &candidates, &set, &config).unwrap();
            assert_eq!(values.len(), 10);
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)), "{:?}", values);
        }
        let noise = run(random, &candidates, &set, &config).unwrap();
        assert!(noise.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_uncertainty_grows_with_magnitude() {
        let candidates = vec![vec![0.0], vec![1.0], vec![2.0]];
        let set = existing(&[(vec![0.0], 0.0)]);
        let values = run(uncertainty, &candidates, &set, &AcquisitionConfig::default()).unwrap();
        assert_eq!(values, vec![0.0, 0.25, 1.0]);
        let negated = run(certainty, &candidates, &set, &AcquisitionConfig::default()).unwrap();
        assert_eq!(negated, vec![-0.0, -0.25, -1.0]);
    }

    #[test]
    fn test_duplicate_point_has_zero_distance_and_density() {
        let candidates = vec![vec![1.0, 1.0], vec![3.0, 5.0]];
        let set = existing(&[(vec![1.0, 1.0], 2.0)]);
        let config = AcquisitionConfig::default();
        let d = run(distance, &candidates, &set, &config).unwrap();
        let rho = run(density, &candidates, &set, &config).unwrap();
        assert_eq!(d[0], 0.0);
        assert_eq!(rho[0], 0.0);
        // candidate range normalizes the second row to (1, 1)
        assert_relative_eq!(d[1], 2f64.sqrt(), epsilon = 1e-12);
        assert_eq!(run(proximity, &candidates, &set, &config).unwrap()[1], -d[1]);
        assert_eq!(run(sparsity, &candidates, &set, &config).unwrap()[1], -rho[1]);
    }

    #[test]
    fn test_density_is_mean_distance() {
        let candidates = vec![vec![0.0], vec![1.0]];
        let set = existing(&[(vec![0.0], 0.0), (vec![1.0], 0.0)]);
        let config = AcquisitionConfig::default().with_distance_metric(DistanceMetric::CityBlock);
        assert_eq!(run(density, &candidates, &set, &config).unwrap(), vec![0.5, 0.5]);
        assert_eq!(run(distance, &candidates, &set, &config).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_cosine_zero_vector_candidate_stays_finite() {
        // the range transform maps the first candidate to the origin
        let candidates = vec![vec![0.0, 0.0], vec![1.0, 2.0], vec![2.0, 1.0]];
        let set = existing(&[(vec![1.0, 1.0], 0.0), (vec![2.0, 2.0], 0.0)]);
        let config = AcquisitionConfig::default().with_distance_metric(DistanceMetric::Cosine);
        let d = run(distance, &candidates, &set, &config).unwrap();
        let rho = run(density, &candidates, &set, &config).unwrap();
        assert!(d.iter().chain(&rho).all(|v| v.is_finite()), "{:?} {:?}", d, rho);
        assert_eq!(d[0], 1.0);
        assert_eq!(rho[0], 1.0);
        assert_relative_eq!(d[1], 1.0 - 1.5 / 2.5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d[2], d[1], epsilon = 1e-12);
    }

    #[test]
    fn test_distance_reductions_propagate_nan() {
        assert!(min_of(&[0.5, f64::NAN, 0.2]).is_nan());
        assert!(min_of(&[f64::NAN, 0.2]).is_nan());
        assert!(mean_of(&[0.5, f64::NAN]).is_nan());
        assert_eq!(min_of(&[0.5, 0.2, 0.9]), 0.2);
        assert_eq!(mean_of(&[0.5, 1.5]), 1.0);
    }

    #[test]
    fn test_empty_existing_and_dimension_mismatch() {
        let empty = LabeledSet::new();
        let config = AcquisitionConfig::default();
        assert_eq!(
            run(distance, &[vec![0.0]], &empty, &config).unwrap_err(),
            AcquisitionError::EmptyExisting("distance")
        );
        let set = existing(&[(vec![0.0, 0.0], 0.0)]);
        assert!(matches!(
            run(density, &[vec![0.0]], &set, &config),
            Err(AcquisitionError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_score_reg_weights_members() {
        let candidates = vec![vec![0.0], vec![1.0], vec![3.0]];
        let set = existing(&[(vec![0.0], 0.0)]);
        let config = AcquisitionConfig::default().with_difference(1e-4);
        let plain = run(gradient, &candidates, &set, &config).unwrap();
        let weighted = run(
            gradient,
            &candidates,
            &set,
            &AcquisitionConfig::default().with_difference(1e-4).with_score_reg(true),
        )
        .unwrap();
        // gradients are all proportional to |x|, so scaling members keeps the order
        assert_relative_eq!(plain[1], weighted[1], epsilon = 1e-3);
        assert_eq!(plain[0], 0.0);
    }

    #[derive(Debug)]
    struct FixedPosterior(Vec<f64>, Vec<f64>);

    impl GaussianPosterior for FixedPosterior {
        fn predict(&self, _: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<f64>), AcquisitionError> {
            Ok((self.0.clone(), self.1.clone()))
        }
    }

    #[derive(Debug)]
    struct FixedGaussian(Vec<f64>, Vec<f64>);

    impl GaussianSurrogate for FixedGaussian {
        fn fit(
            &self,
            _: &[Vec<f64>],
            _: &[f64],
        ) -> Result<Box<dyn GaussianPosterior>, AcquisitionError> {
            Ok(Box::new(FixedPosterior(self.0.clone(), self.1.clone())))
        }
    }

    #[test]
    fn test_know_grad_zero_std_contributes_zero() {
        let candidates = vec![vec![0.0], vec![1.0], vec![2.0]];
        let set = existing(&[(vec![0.0], 1.0)]);
        let gpr = FixedGaussian(vec![1.0, 2.0, 5.0], vec![0.0, 1.0, 0.5]);
        let config = AcquisitionConfig::default().with_gpr(Arc::new(gpr));
        let values = run(know_grad, &candidates, &set, &config).unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
        assert_eq!(values[0], 0.0);
        assert!(values[1] > 0.0 && values[2] > 0.0);
    }

    #[test]
    fn test_gaussian_unc_uses_supplied_gpr() {
        let candidates = vec![vec![0.0], vec![1.0]];
        let set = existing(&[(vec![0.0], 1.0)]);
        let gpr = FixedGaussian(vec![0.0, 0.0], vec![0.2, 0.4]);
        let config = AcquisitionConfig::default().with_gpr(Arc::new(gpr));
        assert_eq!(run(gaussian_unc, &candidates, &set, &config).unwrap(), vec![0.0, 1.0]);

        let short = FixedGaussian(vec![0.0], vec![0.2]);
        let config = AcquisitionConfig::default().with_gpr(Arc::new(short));
        assert!(matches!(
            run(gaussian_unc, &candidates, &set, &config),
            Err(AcquisitionError::Gaussian(_))
        ));
    }
}
