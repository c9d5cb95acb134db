//! Acquisition scoring
//!
//! Turns (candidates, labeled set, surrogate, weights, config) into one scalar
//! objective per candidate. Criteria are looked up by name in a registry and
//! combined linearly.

pub mod config;
pub mod criteria;
pub mod engine;
pub mod finite_difference;
pub mod gaussian;
pub mod normalize;
pub mod summary;

pub mod prelude {
    pub use super::config::{AcquisitionConfig, AcquisitionWeights, DistanceMetric};
    pub use super::criteria::{CriterionContext, CriterionFn, CriterionRegistry};
    pub use super::engine::{objective, AcquisitionEngine};
    pub use super::gaussian::{
        FeatureScaler, FeatureTransform, GaussianPosterior, GaussianProcess,
        GaussianProcessConfig, GaussianSurrogate, MaternNu, NormalDistribution, StandardNormal,
        StandardScaler,
    };
    pub use super::normalize::{min_max, scale_objective, z_score};
    pub use super::summary::ObjectiveSummary;
}
