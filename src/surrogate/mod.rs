//! Surrogate models
//!
//! The [`SurrogateModel`](traits::SurrogateModel) seam plus a ridge-ensemble
//! reference implementation.

pub mod artifact;
pub mod ridge;
pub mod traits;

pub mod prelude {
    pub use super::artifact::ArtifactPath;
    pub use super::ridge::{RidgeEnsemble, RidgeEnsembleConfig};
    pub use super::traits::{Ensemble, EnsembleMember, SurrogateModel, UnitHints};
}
