//! Data sets and providers
//!
//! This module defines the labeled/candidate row sets the loop owns, the
//! [`DataProvider`](provider::DataProvider) seam, and the bundled synthetic
//! and pre-built providers.

pub mod benchmarks;
pub mod bounds;
pub mod dataset;
pub mod provider;
pub mod test_function;

pub mod prelude {
    pub use super::benchmarks::{Ackley, FnTarget, Rastrigin, Rosenbrock, Sphere, SyntheticFunction};
    pub use super::bounds::{Bounds, MultiBounds};
    pub use super::dataset::{CandidateSet, LabeledSet, RowId};
    pub use super::provider::{DataProvider, Dataset, EvaluationSplits};
    pub use super::test_function::{TestFunction, TestFunctionBuilder, TestFunctionConfig};
}
