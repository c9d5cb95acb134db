//! # symbal
//!
//! Batch active learning for symbolic-regression surrogates.
//!
//! Each iteration fits a formula-producing surrogate on the labeled rows,
//! scores every unlabeled candidate with a weighted combination of acquisition
//! criteria, picks a diverse batch and labels it through a data provider.
//!
//! ## Core Concepts
//!
//! - **Acquisition criteria**: gradient, curvature, ensemble disagreement,
//!   distance, density, Gaussian-process uncertainty and knowledge gradient,
//!   combined by name and weight
//! - **Regression guard**: a refit that is worse on the training data is
//!   discarded in favour of the previous model
//! - **Batch selection**: pluggable selectors that balance objective against
//!   redundancy within a batch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use symbal::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let problem = TestFunction::builder()
//!     .target(Rosenbrock::new(2))
//!     .seed(7)
//!     .build()?;
//!
//! let result = ActiveLearning::builder()
//!     .provider(problem)
//!     .surrogate(RidgeEnsemble::default())
//!     .selector(DiversitySelector::new())
//!     .iterations(5)
//!     .batch_size(5)
//!     .build()?
//!     .run(&mut rng)?;
//! ```

pub mod acquisition;
pub mod active;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod selection;
pub mod surrogate;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::acquisition::prelude::*;
    pub use crate::active::prelude::*;
    pub use crate::data::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::selection::prelude::*;
    pub use crate::surrogate::prelude::*;
}
