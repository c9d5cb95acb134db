//! Greedy diversity-aware batch selection
//!
//! Rows are picked one at a time by highest adjusted objective. After each
//! pick, every remaining row is penalized by a Gaussian kernel centred on the
//! picked row, so the next pick prefers high-objective rows away from the
//! batch so far.
//!
//! Emitted columns (one value per offered row):
//! - `objective`: the objective min-max scaled to [0, 1]
//! - `penalty`: accumulated penalty after the whole batch
//! - `adjusted`: `objective - penalty`
//! - `order`: 1-based pick position, 0 for rows not picked

use rand::RngCore;
use tracing::debug;

use super::penalty::PenaltyTable;
use super::traits::{
    check_available, BatchSelector, ScoredCandidates, SelectionConfig, SelectionOutcome,
};
use crate::acquisition::normalize::{min_max, FeatureRange};
use crate::error::SelectionError;

/// Kernel-penalized greedy batch selector
#[derive(Clone, Copy, Debug, Default)]
pub struct DiversitySelector;

impl DiversitySelector {
    /// Create a selector
    pub fn new() -> Self {
        Self
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Position of the highest value among rows not yet taken; ties go to the
/// lower position and NaN never wins
fn argmax_open(values: &[f64], taken: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if taken[i] || v.is_nan() {
            continue;
        }
        if best.map_or(true, |b| v > values[b]) {
            best = Some(i);
        }
    }
    best.or_else(|| taken.iter().position(|t| !t))
}

impl BatchSelector for DiversitySelector {
    fn select(
        &self,
        scored: &ScoredCandidates,
        batch_size: usize,
        config: &SelectionConfig,
        _rng: &mut dyn RngCore,
    ) -> Result<SelectionOutcome, SelectionError> {
        check_available(scored, batch_size)?;
        if config.penalty_width.is_nan() || config.penalty_width <= 0.0 {
            return Err(SelectionError::Malformed(format!(
                "penalty width must be positive, got {}",
                config.penalty_width
            )));
        }

        let objective = min_max(scored.objective());
        let features = if config.normalize_features {
            FeatureRange::fit(scored.features()).transform(scored.features())
        } else {
            scored.features().to_vec()
        };
        let two_w2 = 2.0 * config.penalty_width * config.penalty_width;

        let n = scored.len();
        let mut penalty = vec![0.0; n];
        let mut adjusted = objective.clone();
        let mut taken = vec![false; n];
        let mut order = vec![0.0; n];
        let mut selected = Vec::with_capacity(batch_size);

        for pick in 0..batch_size {
            let Some(i) = argmax_open(&adjusted, &taken) else {
                break;
            };
            taken[i] = true;
            order[i] = (pick + 1) as f64;
            selected.push(scored.ids()[i]);
            for j in 0..n {
                let k = (-squared_distance(&features[i], &features[j]) / two_w2).exp();
                penalty[j] += config.penalty_weight * k;
                adjusted[j] = objective[j] - penalty[j];
            }
        }
        debug!(selected = selected.len(), offered = n, "diversity selection done");

        Ok(SelectionOutcome {
            selected,
            penalties: PenaltyTable::new()
                .with_column("objective", objective)
                .with_column("penalty", penalty)
                .with_column("adjusted", adjusted)
                .with_column("order", order),
        })
    }
}
