//! Batch selection
//!
//! A [`BatchSelector`](traits::BatchSelector) receives every candidate with its
//! objective and returns the rows to label next plus a table of diagnostic
//! penalty columns.

pub mod diversity;
pub mod penalty;
pub mod top_k;
pub mod traits;

pub mod prelude {
    pub use super::diversity::DiversitySelector;
    pub use super::penalty::PenaltyTable;
    pub use super::top_k::TopKSelector;
    pub use super::traits::{BatchSelector, ScoredCandidates, SelectionConfig, SelectionOutcome};
}
