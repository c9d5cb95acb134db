//! Model-regression guard
//!
//! After each refit the new surrogate is compared with the previous one by
//! mean absolute error on the current training data. A strictly worse fit is
//! discarded. NaN on either side also keeps the previous model.

use crate::data::dataset::LabeledSet;
use crate::diagnostics::scoring::mean_absolute_error;
use crate::error::SurrogateError;
use crate::surrogate::traits::SurrogateModel;

/// MAEs compared by the guard and its decision
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardOutcome {
    /// MAE of the previous model
    pub previous_mae: f64,
    /// MAE of the new fit
    pub current_mae: f64,
    /// The new fit should be discarded
    pub rolled_back: bool,
}

/// Decide whether to keep the previous model
pub fn should_roll_back(previous_mae: f64, current_mae: f64) -> bool {
    previous_mae.is_nan() || current_mae.is_nan() || current_mae > previous_mae
}

/// Compare two surrogates on the labeled set
pub fn compare(
    previous: &dyn SurrogateModel,
    current: &dyn SurrogateModel,
    labeled: &LabeledSet,
) -> Result<GuardOutcome, SurrogateError> {
    let truth = labeled.outputs();
    let previous_mae = mean_absolute_error(truth, &previous.predict(labeled.features(), None)?);
    let current_mae = mean_absolute_error(truth, &current.predict(labeled.features(), None)?);
    Ok(GuardOutcome {
        previous_mae,
        current_mae,
        rolled_back: should_roll_back(previous_mae, current_mae),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::RowId;
    use crate::surrogate::ridge::RidgeEnsemble;

    #[test]
    fn test_policy() {
        assert!(!should_roll_back(1.0, 0.5));
        assert!(!should_roll_back(1.0, 1.0));
        assert!(should_roll_back(1.0, 1.5));
        assert!(should_roll_back(f64::NAN, 0.5));
        assert!(should_roll_back(0.5, f64::NAN));
    }

    #[test]
    fn test_compare_prefers_better_fit() {
        let labeled = LabeledSet::from_rows(
            (0..10).map(|i| (RowId(i), vec![i as f64], (i * i) as f64)),
        )
        .unwrap();
        let mut good = RidgeEnsemble::default();
        good.fit(labeled.features(), labeled.outputs(), None).unwrap();

        let constant =
            LabeledSet::from_rows((0..10).map(|i| (RowId(i), vec![i as f64], 0.0))).unwrap();
        let mut bad = RidgeEnsemble::default();
        bad.fit(constant.features(), constant.outputs(), None).unwrap();

        let outcome = compare(&good, &bad, &labeled).unwrap();
        assert!(outcome.rolled_back);
        assert!(outcome.current_mae > outcome.previous_mae);

        let outcome = compare(&bad, &good, &labeled).unwrap();
        assert!(!outcome.rolled_back);
    }
}
