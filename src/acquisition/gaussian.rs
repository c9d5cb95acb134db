//! Gaussian capabilities for the `gaussian_unc` and `know_grad` criteria
//!
//! Three small seams keep the acquisition engine independent of any
//! particular statistics backend:
//!
//! - [`GaussianSurrogate`] fits a posterior that predicts mean and std
//! - [`FeatureScaler`] fits a feature transform on the existing set
//! - [`NormalDistribution`] provides the standard normal CDF and PDF
//!
//! The default implementations are a Matérn + white-noise Gaussian process
//! with a zero prior mean, a [`StandardScaler`] and [`StandardNormal`].

use std::f64::consts::{PI, SQRT_2};
use std::fmt::Debug;

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

use crate::error::AcquisitionError;

/// Fitted Gaussian posterior
pub trait GaussianPosterior: Debug + Send + Sync {
    /// Predictive mean and standard deviation per row
    fn predict(&self, features: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<f64>), AcquisitionError>;
}

/// Factory for Gaussian posteriors
pub trait GaussianSurrogate: Debug + Send + Sync {
    /// Fit on features and outputs
    fn fit(
        &self,
        features: &[Vec<f64>],
        output: &[f64],
    ) -> Result<Box<dyn GaussianPosterior>, AcquisitionError>;
}

/// Fitted feature transform
pub trait FeatureTransform: Debug + Send + Sync {
    /// Transform rows
    fn transform(&self, features: &[Vec<f64>]) -> Vec<Vec<f64>>;
}

/// Factory for feature transforms
pub trait FeatureScaler: Debug + Send + Sync {
    /// Fit on reference rows
    fn fit(&self, features: &[Vec<f64>]) -> Box<dyn FeatureTransform>;
}

/// Univariate distribution used by the knowledge gradient
pub trait NormalDistribution: Debug + Send + Sync {
    /// Cumulative distribution function
    fn cdf(&self, z: f64) -> f64;
    /// Probability density function
    fn pdf(&self, z: f64) -> f64;
}

/// Standard normal N(0, 1)
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardNormal;

impl NormalDistribution for StandardNormal {
    fn cdf(&self, z: f64) -> f64 {
        0.5 * erfc(-z / SQRT_2)
    }

    fn pdf(&self, z: f64) -> f64 {
        (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
    }
}

/// Zero-mean, unit-variance feature scaling
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardScaler;

/// Column means and standard deviations fitted by [`StandardScaler`]
#[derive(Clone, Debug, PartialEq)]
pub struct StandardTransform {
    /// Column means
    pub mean: Vec<f64>,
    /// Column population standard deviations (zero replaced by one)
    pub scale: Vec<f64>,
}

impl StandardTransform {
    /// Fit on reference rows
    pub fn fit(features: &[Vec<f64>]) -> Self {
        let dimension = features.first().map_or(0, Vec::len);
        let n = features.len().max(1) as f64;
        let mut mean = vec![0.0; dimension];
        for row in features {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut var = vec![0.0; dimension];
        for row in features {
            for ((s, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let s = v.sqrt();
                if s > 0.0 && s.is_finite() {
                    s
                } else {
                    1.0
                }
            })
            .collect();
        Self { mean, scale }
    }
}

impl FeatureTransform for StandardTransform {
    fn transform(&self, features: &[Vec<f64>]) -> Vec<Vec<f64>> {
        features
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect()
            })
            .collect()
    }
}

impl FeatureScaler for StandardScaler {
    fn fit(&self, features: &[Vec<f64>]) -> Box<dyn FeatureTransform> {
        Box::new(StandardTransform::fit(features))
    }
}

/// Smoothness of the Matérn kernel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaternNu {
    /// ν = 1/2 (exponential kernel)
    #[default]
    Half,
    /// ν = 3/2
    ThreeHalves,
    /// ν = 5/2
    FiveHalves,
}

impl MaternNu {
    /// Correlation at scaled distance `r`
    pub fn correlation(&self, r: f64) -> f64 {
        match self {
            Self::Half => (-r).exp(),
            Self::ThreeHalves => {
                let s = 3f64.sqrt() * r;
                (1.0 + s) * (-s).exp()
            }
            Self::FiveHalves => {
                let s = 5f64.sqrt() * r;
                (1.0 + s + s * s / 3.0) * (-s).exp()
            }
        }
    }
}

/// Configuration for [`GaussianProcess`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianProcessConfig {
    /// Matérn smoothness
    pub nu: MaternNu,
    /// Length scale used when `optimize` is off
    pub length_scale: f64,
    /// White-noise level used when `optimize` is off
    pub noise_level: f64,
    /// Select length scale and noise by log marginal likelihood
    pub optimize: bool,
    /// Length-scale grid as (min, max, points), log-spaced
    pub length_scale_grid: (f64, f64, usize),
    /// Noise grid as (min, max, points), log-spaced
    pub noise_grid: (f64, f64, usize),
}

impl Default for GaussianProcessConfig {
    fn default() -> Self {
        Self {
            nu: MaternNu::Half,
            length_scale: 1.0,
            noise_level: 1.0,
            optimize: true,
            length_scale_grid: (1e-2, 1e2, 9),
            noise_grid: (1e-5, 1e1, 7),
        }
    }
}

fn log_grid((min, max, points): (f64, f64, usize)) -> Vec<f64> {
    match points {
        0 => vec![],
        1 => vec![min],
        n => {
            let (lo, hi) = (min.ln(), max.ln());
            (0..n)
                .map(|i| (lo + (hi - lo) * i as f64 / (n - 1) as f64).exp())
                .collect()
        }
    }
}

/// Matérn + white-noise Gaussian-process regressor with zero prior mean
#[derive(Clone, Debug, Default)]
pub struct GaussianProcess {
    config: GaussianProcessConfig,
}

impl GaussianProcess {
    /// Create with a configuration
    pub fn new(config: GaussianProcessConfig) -> Self {
        Self { config }
    }

    /// Fixed hyperparameters, no grid search
    pub fn fixed(nu: MaternNu, length_scale: f64, noise_level: f64) -> Self {
        Self::new(GaussianProcessConfig {
            nu,
            length_scale,
            noise_level,
            optimize: false,
            ..Default::default()
        })
    }

    /// Configuration
    pub fn config(&self) -> &GaussianProcessConfig {
        &self.config
    }

    fn candidates(&self) -> Vec<(f64, f64)> {
        if !self.config.optimize {
            return vec![(self.config.length_scale, self.config.noise_level)];
        }
        let noises = log_grid(self.config.noise_grid);
        log_grid(self.config.length_scale_grid)
            .into_iter()
            .flat_map(|l| noises.iter().map(move |&s| (l, s)))
            .collect()
    }
}

fn squared_norm_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn kernel_matrix(
    features: &[Vec<f64>],
    nu: MaternNu,
    length_scale: f64,
    noise_level: f64,
) -> DMatrix<f64> {
    let n = features.len();
    DMatrix::from_fn(n, n, |i, j| {
        let r = squared_norm_diff(&features[i], &features[j]).sqrt() / length_scale;
        let k = nu.correlation(r);
        if i == j {
            k + noise_level
        } else {
            k
        }
    })
}

impl GaussianSurrogate for GaussianProcess {
    fn fit(
        &self,
        features: &[Vec<f64>],
        output: &[f64],
    ) -> Result<Box<dyn GaussianPosterior>, AcquisitionError> {
        if features.is_empty() {
            return Err(AcquisitionError::Gaussian("no training rows".to_string()));
        }
        if features.len() != output.len() {
            return Err(AcquisitionError::Gaussian(format!(
                "{} outputs for {} rows",
                output.len(),
                features.len()
            )));
        }
        let n = features.len();
        let y = DVector::from_column_slice(output);

        let mut best: Option<(f64, MaternPosterior)> = None;
        for (length_scale, noise_level) in self.candidates() {
            let k = kernel_matrix(features, self.config.nu, length_scale, noise_level);
            let Some(chol) = k.cholesky() else {
                continue;
            };
            let alpha = chol.solve(&y);
            let log_det: f64 = chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum();
            let lml = -0.5 * y.dot(&alpha) - log_det - 0.5 * n as f64 * (2.0 * PI).ln();
            if !lml.is_finite() {
                continue;
            }
            if best.as_ref().map_or(true, |(b, _)| lml > *b) {
                best = Some((
                    lml,
                    MaternPosterior {
                        nu: self.config.nu,
                        length_scale,
                        noise_level,
                        log_marginal_likelihood: lml,
                        training: features.to_vec(),
                        alpha,
                        chol,
                    },
                ));
            }
        }

        best.map(|(_, posterior)| Box::new(posterior) as Box<dyn GaussianPosterior>)
            .ok_or_else(|| {
                AcquisitionError::Gaussian("kernel matrix is not positive definite".to_string())
            })
    }
}

/// Posterior of a fitted [`GaussianProcess`]
#[derive(Clone, Debug)]
pub struct MaternPosterior {
    nu: MaternNu,
    length_scale: f64,
    noise_level: f64,
    log_marginal_likelihood: f64,
    training: Vec<Vec<f64>>,
    alpha: DVector<f64>,
    chol: Cholesky<f64, Dyn>,
}

impl MaternPosterior {
    /// Selected length scale
    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Selected white-noise level
    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }

    /// Log marginal likelihood at the selected hyperparameters
    pub fn log_marginal_likelihood(&self) -> f64 {
        self.log_marginal_likelihood
    }
}

impl GaussianPosterior for MaternPosterior {
    fn predict(&self, features: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<f64>), AcquisitionError> {
        let dimension = self.training.first().map_or(0, Vec::len);
        if let Some(row) = features.iter().find(|r| r.len() != dimension) {
            return Err(AcquisitionError::DimensionMismatch {
                expected: dimension,
                actual: row.len(),
            });
        }
        let mut mean = Vec::with_capacity(features.len());
        let mut std = Vec::with_capacity(features.len());
        for x in features {
            let k_star = DVector::from_iterator(
                self.training.len(),
                self.training.iter().map(|t| {
                    self.nu
                        .correlation(squared_norm_diff(x, t).sqrt() / self.length_scale)
                }),
            );
            mean.push(k_star.dot(&self.alpha));
            let v = self.chol.solve(&k_star);
            // Prior variance includes the white-noise term
            let var = 1.0 + self.noise_level - k_star.dot(&v);
            std.push(var.max(0.0).sqrt());
        }
        Ok((mean, std))
    }
}
