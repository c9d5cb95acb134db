//! Plain top-k selection by objective

use rand::RngCore;

use super::penalty::PenaltyTable;
use super::traits::{
    check_available, BatchSelector, ScoredCandidates, SelectionConfig, SelectionOutcome,
};
use crate::error::SelectionError;

/// Selects the `batch_size` highest-objective rows, ignoring diversity
///
/// Ties keep offer order; NaN objectives sort last.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopKSelector;

impl BatchSelector for TopKSelector {
    fn select(
        &self,
        scored: &ScoredCandidates,
        batch_size: usize,
        _config: &SelectionConfig,
        _rng: &mut dyn RngCore,
    ) -> Result<SelectionOutcome, SelectionError> {
        check_available(scored, batch_size)?;
        let objective = scored.objective();
        let mut order: Vec<usize> = (0..scored.len()).collect();
        order.sort_by(|&a, &b| {
            let key = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
            key(objective[b]).total_cmp(&key(objective[a]))
        });

        let mut rank = vec![0.0; scored.len()];
        for (r, &i) in order.iter().enumerate() {
            rank[i] = (r + 1) as f64;
        }
        let selected = order
            .iter()
            .take(batch_size)
            .map(|&i| scored.ids()[i])
            .collect();

        Ok(SelectionOutcome {
            selected,
            penalties: PenaltyTable::new()
                .with_column("objective", objective.to_vec())
                .with_column("rank", rank),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::RowId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_top_k() {
        let scored = ScoredCandidates::new(
            vec![RowId(3), RowId(5), RowId(8), RowId(13)],
            vec![0.2, f64::NAN, 0.9, 0.2],
            vec![vec![0.0]; 4],
        )
        .unwrap();
        let outcome = TopKSelector
            .select(&scored, 3, &SelectionConfig::default(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(outcome.selected, vec![RowId(8), RowId(3), RowId(13)]);
        assert_eq!(outcome.penalties.column("rank").unwrap(), &[2.0, 4.0, 1.0, 3.0]);
    }
}
