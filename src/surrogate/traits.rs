//! Surrogate model traits
//!
//! A surrogate is an ensemble of competing formulas. Each member carries a
//! loss and a quality score; one member is designated best. Prediction by a
//! specific member is a capability of the model, not a separate type.

use serde::{Deserialize, Serialize};

use super::artifact::ArtifactPath;
use crate::error::SurrogateError;

/// Unit annotations forwarded to [`SurrogateModel::fit`]
///
/// Only passed when both feature and output units are configured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitHints {
    /// Unit of each feature
    pub features: Vec<String>,
    /// Unit of the output
    pub output: String,
}

impl UnitHints {
    /// Combine optional hints; `None` unless both are present
    pub fn from_parts(features: Option<&[String]>, output: Option<&str>) -> Option<Self> {
        match (features, output) {
            (Some(features), Some(output)) => Some(Self {
                features: features.to_vec(),
                output: output.to_string(),
            }),
            _ => None,
        }
    }
}

/// One competing formula
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnsembleMember {
    /// Human-readable formula
    pub formula: String,
    /// Formula complexity (number of active terms)
    pub complexity: usize,
    /// Training loss (lower is better)
    pub loss: f64,
    /// Quality score (higher is better)
    pub score: f64,
}

/// Ordered collection of competing formulas with a designated best member
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    members: Vec<EnsembleMember>,
    best: usize,
}

impl Ensemble {
    /// Create an ensemble
    pub fn new(members: Vec<EnsembleMember>, best: usize) -> Result<Self, SurrogateError> {
        if !members.is_empty() && best >= members.len() {
            return Err(SurrogateError::MemberOutOfRange {
                index: best,
                len: members.len(),
            });
        }
        Ok(Self { members, best })
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the ensemble has no members (model not fitted)
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All members in order
    pub fn members(&self) -> &[EnsembleMember] {
        &self.members
    }

    /// Member by index
    pub fn get(&self, index: usize) -> Option<&EnsembleMember> {
        self.members.get(index)
    }

    /// Index of the best member
    pub fn best_index(&self) -> usize {
        self.best
    }

    /// Best member
    pub fn best(&self) -> Option<&EnsembleMember> {
        self.members.get(self.best)
    }

    /// Lowest-loss member, reported as the secondary formula
    pub fn secondary(&self) -> Option<&EnsembleMember> {
        self.members
            .iter()
            .filter(|m| !m.loss.is_nan())
            .min_by(|a, b| a.loss.total_cmp(&b.loss))
    }

    /// Quality scores in member order
    pub fn scores(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.score).collect()
    }
}

/// A formula-producing regression model
///
/// Object safe so acquisition criteria can take `&dyn SurrogateModel`.
pub trait SurrogateModel {
    /// Fit on labeled features and outputs
    fn fit(
        &mut self,
        features: &[Vec<f64>],
        output: &[f64],
        units: Option<&UnitHints>,
    ) -> Result<(), SurrogateError>;

    /// Predict with the best member, or with the given member index
    fn predict(&self, features: &[Vec<f64>], member: Option<usize>)
        -> Result<Vec<f64>, SurrogateError>;

    /// Fitted ensemble
    fn ensemble(&self) -> &Ensemble;

    /// Artifact identifier
    fn artifact(&self) -> &ArtifactPath;

    /// Mutable artifact identifier
    fn artifact_mut(&mut self) -> &mut ArtifactPath;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(loss: f64, score: f64) -> EnsembleMember {
        EnsembleMember {
            formula: format!("y = {}", loss),
            complexity: 1,
            loss,
            score,
        }
    }

    #[test]
    fn test_ensemble_rejects_bad_best_index() {
        let err = Ensemble::new(vec![member(1.0, 0.5)], 2).unwrap_err();
        assert_eq!(err, SurrogateError::MemberOutOfRange { index: 2, len: 1 });
    }

    #[test]
    fn test_best_and_secondary() {
        let ensemble = Ensemble::new(
            vec![member(3.0, 0.1), member(0.5, 0.2), member(f64::NAN, 0.9)],
            0,
        )
        .unwrap();
        assert_eq!(ensemble.best().unwrap().loss, 3.0);
        assert_eq!(ensemble.secondary().unwrap().loss, 0.5);
        assert_eq!(ensemble.scores(), vec![0.1, 0.2, 0.9]);
    }

    #[test]
    fn test_unit_hints_require_both_parts() {
        let features = vec!["m".to_string(), "s".to_string()];
        assert!(UnitHints::from_parts(Some(&features), None).is_none());
        assert!(UnitHints::from_parts(None, Some("kg")).is_none());
        let hints = UnitHints::from_parts(Some(&features), Some("kg")).unwrap();
        assert_eq!(hints.output, "kg");
    }
}
