//! Data providers
//!
//! A [`DataProvider`] supplies the initial labeled and candidate sets, the
//! held-out evaluation splits, and acts as the labeling oracle when the loop
//! promotes a candidate row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::dataset::{CandidateSet, LabeledSet, RowId};
use crate::error::DataError;

/// Held-out data used to score each iteration's surrogate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EvaluationSplits {
    /// Separate extrapolation and interpolation test sets
    Split {
        /// Points outside the sampled domain
        extrapolation: LabeledSet,
        /// Points inside the sampled domain
        interpolation: LabeledSet,
    },
    /// A single holdout set
    Holdout(LabeledSet),
}

/// Source of labeled, candidate and evaluation data
pub trait DataProvider {
    /// Initial labeled rows
    fn labeled_set(&self) -> &LabeledSet;

    /// Initial candidate rows
    fn candidate_set(&self) -> &CandidateSet;

    /// Held-out evaluation data
    fn evaluation_splits(&self) -> &EvaluationSplits;

    /// Produce the output for a candidate row being promoted
    fn label(&self, id: RowId, features: &[f64]) -> Result<f64, DataError>;
}

/// A pre-built dataset
///
/// Candidate outputs are known up front but hidden from the loop until a
/// row is selected.
#[derive(Clone, Debug)]
pub struct Dataset {
    labeled: LabeledSet,
    candidates: CandidateSet,
    hidden: HashMap<RowId, f64>,
    splits: EvaluationSplits,
}

impl Dataset {
    /// Build a dataset from labeled rows, candidate rows with their hidden
    /// outputs, and the evaluation splits
    ///
    /// Labeled rows receive identifiers `0..labeled.len()`; candidates follow.
    pub fn new(
        labeled: Vec<(Vec<f64>, f64)>,
        candidates: Vec<(Vec<f64>, f64)>,
        splits: EvaluationSplits,
    ) -> Result<Self, DataError> {
        let offset = labeled.len();
        let labeled_set = LabeledSet::from_rows(
            labeled
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| (RowId(i), x, y)),
        )?;

        let mut hidden = HashMap::with_capacity(candidates.len());
        let mut candidate_set = CandidateSet::new();
        for (i, (x, y)) in candidates.into_iter().enumerate() {
            let id = RowId(offset + i);
            candidate_set.push(id, x)?;
            hidden.insert(id, y);
        }

        if let (Some(a), Some(b)) = (labeled_set.dimension(), candidate_set.dimension()) {
            if a != b {
                return Err(DataError::DimensionMismatch {
                    expected: a,
                    actual: b,
                });
            }
        }

        Ok(Self {
            labeled: labeled_set,
            candidates: candidate_set,
            hidden,
            splits,
        })
    }
}

impl DataProvider for Dataset {
    fn labeled_set(&self) -> &LabeledSet {
        &self.labeled
    }

    fn candidate_set(&self) -> &CandidateSet {
        &self.candidates
    }

    fn evaluation_splits(&self) -> &EvaluationSplits {
        &self.splits
    }

    fn label(&self, id: RowId, _features: &[f64]) -> Result<f64, DataError> {
        self.hidden.get(&id).copied().ok_or(DataError::Labeling {
            id,
            reason: "row is not a candidate of this dataset".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holdout() -> EvaluationSplits {
        EvaluationSplits::Holdout(
            LabeledSet::from_rows(vec![(RowId(100), vec![0.5], 0.25)]).unwrap(),
        )
    }

    #[test]
    fn test_dataset_assigns_disjoint_ids() {
        let ds = Dataset::new(
            vec![(vec![0.0], 0.0), (vec![1.0], 1.0)],
            vec![(vec![2.0], 4.0), (vec![3.0], 9.0)],
            holdout(),
        )
        .unwrap();

        assert_eq!(ds.labeled_set().ids(), &[RowId(0), RowId(1)]);
        assert_eq!(ds.candidate_set().ids(), &[RowId(2), RowId(3)]);
        assert_eq!(ds.label(RowId(3), &[3.0]).unwrap(), 9.0);
        assert!(matches!(
            ds.label(RowId(0), &[0.0]),
            Err(DataError::Labeling { .. })
        ));
    }

    #[test]
    fn test_dataset_rejects_mixed_dimensions() {
        let err = Dataset::new(
            vec![(vec![0.0, 1.0], 0.0)],
            vec![(vec![2.0], 4.0)],
            holdout(),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::DimensionMismatch { .. }));
    }
}
