//! Acquisition configuration
//!
//! Weights name the criteria to combine; [`AcquisitionConfig`] carries the
//! per-criterion options. Both are plain values built fresh for each call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::gaussian::{FeatureScaler, GaussianSurrogate};
use crate::error::AcquisitionError;

/// Criterion name → linear weight
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcquisitionWeights(BTreeMap<String, f64>);

impl AcquisitionWeights {
    /// Empty weight map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a criterion weight
    pub fn with(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.0.insert(name.into(), weight);
        self
    }

    /// Set a criterion weight
    pub fn insert(&mut self, name: impl Into<String>, weight: f64) -> Option<f64> {
        self.0.insert(name.into(), weight)
    }

    /// Weight of a criterion
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Number of named criteria
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no criterion is named
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for AcquisitionWeights {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Pairwise distance metric for the distance and density criteria
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DistanceMetric {
    /// L2 norm
    #[default]
    Euclidean,
    /// Squared L2 norm
    SqEuclidean,
    /// L1 norm
    CityBlock,
    /// L∞ norm
    Chebyshev,
    /// One minus cosine similarity
    Cosine,
}

impl DistanceMetric {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SqEuclidean => "sqeuclidean",
            Self::CityBlock => "cityblock",
            Self::Chebyshev => "chebyshev",
            Self::Cosine => "cosine",
        }
    }

    /// Distance between two equal-length vectors
    ///
    /// Cosine distance involving a zero vector is 0 when both vectors are zero
    /// and 1 (orthogonal) when only one is.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| x - y);
        match self {
            Self::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Self::SqEuclidean => diffs.map(|d| d * d).sum(),
            Self::CityBlock => diffs.map(f64::abs).sum(),
            Self::Chebyshev => diffs.map(f64::abs).fold(0.0, f64::max),
            Self::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
                match (na == 0.0, nb == 0.0) {
                    (true, true) => 0.0,
                    (true, false) | (false, true) => 1.0,
                    (false, false) => 1.0 - dot / (na * nb),
                }
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = AcquisitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Self::Euclidean),
            "sqeuclidean" => Ok(Self::SqEuclidean),
            "cityblock" | "manhattan" => Ok(Self::CityBlock),
            "chebyshev" => Ok(Self::Chebyshev),
            "cosine" => Ok(Self::Cosine),
            _ => Err(AcquisitionError::UnknownDistanceMetric(s.to_string())),
        }
    }
}

impl TryFrom<String> for DistanceMetric {
    type Error = AcquisitionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DistanceMetric> for String {
    fn from(metric: DistanceMetric) -> Self {
        metric.name().to_string()
    }
}

/// Per-criterion options
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Finite-difference step
    pub difference: f64,
    /// Metric for distance and density
    pub distance_metric: DistanceMetric,
    /// Weight per-member arrays by the member's quality score
    pub score_reg: bool,
    /// Z-score criterion arrays before min-max scaling
    pub standard: bool,
    /// Feature scaler for the Gaussian criteria (standard scaler when unset)
    #[serde(skip)]
    pub scaler: Option<Arc<dyn FeatureScaler>>,
    /// Gaussian surrogate for the Gaussian criteria (Matérn GP when unset)
    #[serde(skip)]
    pub gpr: Option<Arc<dyn GaussianSurrogate>>,
    /// Log summary statistics of the combined objective
    pub debug: bool,
    /// Compute pairwise distances in parallel
    pub parallel: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            difference: 1e-8,
            distance_metric: DistanceMetric::Euclidean,
            score_reg: false,
            standard: false,
            scaler: None,
            gpr: None,
            debug: false,
            parallel: false,
        }
    }
}

impl AcquisitionConfig {
    /// Set the finite-difference step
    pub fn with_difference(mut self, difference: f64) -> Self {
        self.difference = difference;
        self
    }

    /// Set the distance metric
    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Enable score weighting of per-member arrays
    pub fn with_score_reg(mut self, score_reg: bool) -> Self {
        self.score_reg = score_reg;
        self
    }

    /// Enable z-scoring before min-max scaling
    pub fn with_standard(mut self, standard: bool) -> Self {
        self.standard = standard;
        self
    }

    /// Supply a feature scaler
    pub fn with_scaler(mut self, scaler: Arc<dyn FeatureScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Supply a Gaussian surrogate
    pub fn with_gpr(mut self, gpr: Arc<dyn GaussianSurrogate>) -> Self {
        self.gpr = Some(gpr);
        self
    }

    /// Enable debug statistics
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable parallel distance computation
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
