//! Batch selection contract

use std::collections::HashSet;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::penalty::PenaltyTable;
use crate::data::dataset::RowId;
use crate::error::SelectionError;

/// Options passed to every batch selector
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Strength of the penalty around already-selected rows
    pub penalty_weight: f64,
    /// Width of the penalty kernel in (normalized) feature space
    pub penalty_width: f64,
    /// Min-max normalize features before measuring distances
    pub normalize_features: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            penalty_weight: 1.0,
            penalty_width: 0.1,
            normalize_features: true,
        }
    }
}

impl SelectionConfig {
    /// Set the penalty strength
    pub fn with_penalty_weight(mut self, weight: f64) -> Self {
        self.penalty_weight = weight;
        self
    }

    /// Set the penalty kernel width
    pub fn with_penalty_width(mut self, width: f64) -> Self {
        self.penalty_width = width;
        self
    }

    /// Enable or disable feature normalization
    pub fn with_normalize_features(mut self, normalize: bool) -> Self {
        self.normalize_features = normalize;
        self
    }
}

/// Candidate rows with their objective values
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidates {
    ids: Vec<RowId>,
    objective: Vec<f64>,
    features: Vec<Vec<f64>>,
}

impl ScoredCandidates {
    /// Create, checking that all three parts have the same length
    pub fn new(
        ids: Vec<RowId>,
        objective: Vec<f64>,
        features: Vec<Vec<f64>>,
    ) -> Result<Self, SelectionError> {
        if ids.len() != objective.len() || ids.len() != features.len() {
            return Err(SelectionError::Malformed(format!(
                "{} ids, {} objective values, {} feature rows",
                ids.len(),
                objective.len(),
                features.len()
            )));
        }
        Ok(Self {
            ids,
            objective,
            features,
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row identifiers
    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Objective per row
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Feature rows
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Rows of `[objective, features...]`
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.objective
            .iter()
            .zip(&self.features)
            .map(|(&o, x)| {
                let mut row = Vec::with_capacity(x.len() + 1);
                row.push(o);
                row.extend_from_slice(x);
                row
            })
            .collect()
    }
}

/// Selected identifiers plus diagnostic penalty columns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionOutcome {
    /// Selected rows, in selection order
    pub selected: Vec<RowId>,
    /// Diagnostics
    pub penalties: PenaltyTable,
}

impl SelectionOutcome {
    /// Check the selection is exactly `batch_size` distinct offered rows
    pub fn validate(
        &self,
        scored: &ScoredCandidates,
        batch_size: usize,
    ) -> Result<(), SelectionError> {
        if self.selected.len() != batch_size {
            return Err(SelectionError::WrongBatchSize {
                expected: batch_size,
                actual: self.selected.len(),
            });
        }
        let offered: HashSet<RowId> = scored.ids().iter().copied().collect();
        let mut seen = HashSet::with_capacity(batch_size);
        for &id in &self.selected {
            if !offered.contains(&id) {
                return Err(SelectionError::UnknownRow(id));
            }
            if !seen.insert(id) {
                return Err(SelectionError::DuplicateRow(id));
            }
        }
        Ok(())
    }
}

/// Chooses a batch of rows to label next
pub trait BatchSelector {
    /// Select `batch_size` rows
    fn select(
        &self,
        scored: &ScoredCandidates,
        batch_size: usize,
        config: &SelectionConfig,
        rng: &mut dyn RngCore,
    ) -> Result<SelectionOutcome, SelectionError>;
}

/// Fail early when fewer rows are offered than requested
pub fn check_available(scored: &ScoredCandidates, batch_size: usize) -> Result<(), SelectionError> {
    if batch_size > scored.len() {
        return Err(SelectionError::InsufficientCandidates {
            requested: batch_size,
            available: scored.len(),
        });
    }
    Ok(())
}
