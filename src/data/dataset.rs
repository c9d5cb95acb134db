//! Labeled and candidate row sets
//!
//! Rows carry a stable [`RowId`] assigned once by the data provider. Rows
//! move from the [`CandidateSet`] to the [`LabeledSet`] by identifier, so
//! removals never shift the identity of the rows that remain.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Stable identifier of a data row
///
/// Identifiers are unique across the labeled and candidate sets of one
/// provider and survive promotion from candidate to labeled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row({})", self.0)
    }
}

impl From<usize> for RowId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<RowId> for usize {
    fn from(id: RowId) -> Self {
        id.0
    }
}

fn check_dimension(expected: Option<usize>, features: &[f64]) -> Result<usize, DataError> {
    match expected {
        Some(d) if d != features.len() => Err(DataError::DimensionMismatch {
            expected: d,
            actual: features.len(),
        }),
        _ => Ok(features.len()),
    }
}

/// Rows with features and an observed output
///
/// Append-only: rows are never removed once labeled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledSet {
    ids: Vec<RowId>,
    features: Vec<Vec<f64>>,
    #[serde(with = "crate::diagnostics::nan_as_null::vec")]
    outputs: Vec<f64>,
}

impl LabeledSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(id, features, output)` rows
    pub fn from_rows<I>(rows: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (RowId, Vec<f64>, f64)>,
    {
        let mut set = Self::new();
        for (id, features, output) in rows {
            set.push(id, features, output)?;
        }
        Ok(set)
    }

    /// Append a labeled row
    pub fn push(&mut self, id: RowId, features: Vec<f64>, output: f64) -> Result<(), DataError> {
        check_dimension(self.dimension(), &features)?;
        if self.ids.contains(&id) {
            return Err(DataError::DuplicateRow(id));
        }
        self.ids.push(id);
        self.features.push(features);
        self.outputs.push(output);
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the set has no rows
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Feature count, if any row is present
    pub fn dimension(&self) -> Option<usize> {
        self.features.first().map(Vec::len)
    }

    /// Row identifiers in insertion order
    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Feature rows in insertion order
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Outputs in insertion order
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// Largest observed output (NaN-free maximum)
    pub fn max_output(&self) -> Option<f64> {
        self.outputs
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Check if a row identifier is present
    pub fn contains(&self, id: RowId) -> bool {
        self.ids.contains(&id)
    }
}

/// Rows with features awaiting a label
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    ids: Vec<RowId>,
    features: Vec<Vec<f64>>,
}

impl CandidateSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(id, features)` rows
    pub fn from_rows<I>(rows: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (RowId, Vec<f64>)>,
    {
        let mut set = Self::new();
        for (id, features) in rows {
            set.push(id, features)?;
        }
        Ok(set)
    }

    /// Append a candidate row
    pub fn push(&mut self, id: RowId, features: Vec<f64>) -> Result<(), DataError> {
        check_dimension(self.dimension(), &features)?;
        if self.ids.contains(&id) {
            return Err(DataError::DuplicateRow(id));
        }
        self.ids.push(id);
        self.features.push(features);
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the set has no rows
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Feature count, if any row is present
    pub fn dimension(&self) -> Option<usize> {
        self.features.first().map(Vec::len)
    }

    /// Row identifiers in current order
    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Feature rows in current order
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Check if a row identifier is present
    pub fn contains(&self, id: RowId) -> bool {
        self.ids.contains(&id)
    }

    /// Features of a row by identifier
    pub fn get(&self, id: RowId) -> Option<&[f64]> {
        self.ids
            .iter()
            .position(|&r| r == id)
            .and_then(|pos| self.features.get(pos))
            .map(Vec::as_slice)
    }

    /// Remove rows by identifier and return them in the requested order
    ///
    /// Either all rows are removed or, on error, none are.
    pub fn take(&mut self, ids: &[RowId]) -> Result<Vec<(RowId, Vec<f64>)>, DataError> {
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                return Err(DataError::DuplicateRow(id));
            }
            if !self.contains(id) {
                return Err(DataError::UnknownRow(id));
            }
        }

        let mut taken: Vec<Option<Vec<f64>>> = vec![None; ids.len()];
        let mut kept_ids = Vec::with_capacity(self.ids.len() - ids.len());
        let mut kept_features = Vec::with_capacity(self.ids.len() - ids.len());
        for (id, features) in self.ids.drain(..).zip(self.features.drain(..)) {
            match ids.iter().position(|&r| r == id) {
                Some(slot) => taken[slot] = Some(features),
                None => {
                    kept_ids.push(id);
                    kept_features.push(features);
                }
            }
        }
        self.ids = kept_ids;
        self.features = kept_features;

        Ok(ids
            .iter()
            .zip(taken)
            .filter_map(|(&id, features)| features.map(|f| (id, f)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> CandidateSet {
        CandidateSet::from_rows((0..n).map(|i| (RowId(i), vec![i as f64, -(i as f64)]))).unwrap()
    }

    #[test]
    fn test_row_id_display_and_conversion() {
        assert_eq!(RowId(3).to_string(), "Row(3)");
        let raw: usize = RowId::from(9).into();
        assert_eq!(raw, 9);
    }

    #[test]
    fn test_labeled_set_rejects_wrong_dimension() {
        let mut set = LabeledSet::new();
        set.push(RowId(0), vec![1.0, 2.0], 3.0).unwrap();
        let err = set.push(RowId(1), vec![1.0], 0.0).unwrap_err();
        assert_eq!(
            err,
            DataError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_labeled_set_rejects_duplicate_id() {
        let mut set = LabeledSet::new();
        set.push(RowId(0), vec![1.0], 3.0).unwrap();
        assert_eq!(
            set.push(RowId(0), vec![2.0], 0.0).unwrap_err(),
            DataError::DuplicateRow(RowId(0))
        );
    }

    #[test]
    fn test_max_output_skips_nan() {
        let set = LabeledSet::from_rows(vec![
            (RowId(0), vec![0.0], 1.0),
            (RowId(1), vec![1.0], f64::NAN),
            (RowId(2), vec![2.0], 4.0),
        ])
        .unwrap();
        assert_eq!(set.max_output(), Some(4.0));
        assert_eq!(LabeledSet::new().max_output(), None);
    }

    #[test]
    fn test_take_preserves_identity_of_remaining_rows() {
        let mut set = candidates(6);
        let taken = set.take(&[RowId(4), RowId(1)]).unwrap();

        assert_eq!(taken[0].0, RowId(4));
        assert_eq!(taken[0].1, vec![4.0, -4.0]);
        assert_eq!(taken[1].0, RowId(1));
        assert_eq!(set.len(), 4);
        assert_eq!(set.ids(), &[RowId(0), RowId(2), RowId(3), RowId(5)]);
        assert_eq!(set.get(RowId(5)), Some(&[5.0, -5.0][..]));

        // A second removal addresses rows by id, not by shifted position
        let taken = set.take(&[RowId(5)]).unwrap();
        assert_eq!(taken[0].1, vec![5.0, -5.0]);
    }

    #[test]
    fn test_take_is_all_or_nothing() {
        let mut set = candidates(3);
        assert_eq!(
            set.take(&[RowId(0), RowId(9)]).unwrap_err(),
            DataError::UnknownRow(RowId(9))
        );
        assert_eq!(
            set.take(&[RowId(1), RowId(1)]).unwrap_err(),
            DataError::DuplicateRow(RowId(1))
        );
        assert_eq!(set.len(), 3);
    }
}
