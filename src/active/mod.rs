//! Active-learning loop
//!
//! Drives fit, regression guard, evaluation, acquisition, batch selection and
//! labeling over a fixed number of iterations.

pub mod algorithm;
pub mod config;
pub mod guard;
pub mod result;

pub mod prelude {
    pub use super::algorithm::{ActiveLearning, ActiveLearningBuilder, StepResult};
    pub use super::config::ActiveLearningConfig;
    pub use super::guard::{should_roll_back, GuardOutcome};
    pub use super::result::{ActiveLearningResult, RESULT_VERSION};
}
