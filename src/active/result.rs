//! Terminal state of an active-learning run

use serde::{Deserialize, Serialize};

#[cfg(feature = "checkpoint")]
use std::fs::File;
#[cfg(feature = "checkpoint")]
use std::io::{BufReader, BufWriter};
#[cfg(feature = "checkpoint")]
use std::path::Path;

use crate::data::dataset::{CandidateSet, LabeledSet, RowId};
use crate::diagnostics::penalties::PenaltyAudit;
use crate::diagnostics::MetricsTable;
use crate::error::CheckpointError;

/// Current result format version
pub const RESULT_VERSION: u32 = 1;

/// Everything a completed (or paused) run produced
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveLearningResult {
    /// Schema version for forward compatibility
    pub version: u32,
    /// One metrics row per iteration
    pub metrics: MetricsTable,
    /// Rows selected on each iteration
    pub selections: Vec<Vec<RowId>>,
    /// Iteration-prefixed selector diagnostics
    pub penalties: PenaltyAudit,
    /// Labeled set after the last iteration
    pub labeled: LabeledSet,
    /// Remaining candidates after the last iteration
    pub candidates: CandidateSet,
}

impl ActiveLearningResult {
    /// Number of completed iterations
    pub fn iterations(&self) -> usize {
        self.metrics.len()
    }

    /// All selected rows in selection order
    pub fn selected_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.selections.iter().flatten().copied()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version > RESULT_VERSION {
            return Err(CheckpointError::VersionTooNew(self.version));
        }
        Ok(self)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            CheckpointError::Serialization(format!("Failed to serialize result: {}", e))
        })
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let result: Self = serde_json::from_str(json).map_err(|e| {
            CheckpointError::Deserialization(format!("Failed to deserialize result: {}", e))
        })?;
        result.check_version()
    }
}

#[cfg(feature = "checkpoint")]
impl ActiveLearningResult {
    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            CheckpointError::Serialization(format!("Failed to serialize result: {}", e))
        })?;
        Ok(())
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let result: Self = serde_json::from_reader(reader).map_err(|e| {
            CheckpointError::Deserialization(format!("Failed to deserialize result: {}", e))
        })?;
        result.check_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::penalty::PenaltyTable;

    fn sample() -> ActiveLearningResult {
        let mut penalties = PenaltyAudit::new();
        penalties.extend_prefixed(1, PenaltyTable::new().with_column("objective", vec![0.5, 1.0]));
        ActiveLearningResult {
            version: RESULT_VERSION,
            metrics: MetricsTable::new(),
            selections: vec![vec![RowId(3), RowId(4)]],
            penalties,
            labeled: LabeledSet::from_rows(vec![(RowId(0), vec![1.0], 2.0)]).unwrap(),
            candidates: CandidateSet::from_rows(vec![(RowId(5), vec![0.0])]).unwrap(),
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let result = sample();
        let back = ActiveLearningResult::from_json(&result.to_json().unwrap()).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.selected_ids().collect::<Vec<_>>(), vec![RowId(3), RowId(4)]);
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut result = sample();
        result.version = RESULT_VERSION + 1;
        let json = result.to_json().unwrap();
        assert!(matches!(
            ActiveLearningResult::from_json(&json),
            Err(CheckpointError::VersionTooNew(v)) if v == RESULT_VERSION + 1
        ));
    }

    #[test]
    fn test_nan_outputs_and_penalties_roundtrip() {
        let mut result = sample();
        result.penalties.extend_prefixed(
            2,
            PenaltyTable::new().with_column("objective", vec![f64::NAN, 1.0]),
        );
        result.labeled.push(RowId(1), vec![2.0], f64::NAN).unwrap();

        let json = result.to_json().unwrap();
        let back = ActiveLearningResult::from_json(&json).unwrap();

        let column = back.penalties.column("2-objective").unwrap();
        assert!(column[0].is_nan());
        assert_eq!(column[1], 1.0);
        assert_eq!(back.penalties.column("1-objective"), Some(&[0.5, 1.0][..]));
        assert_eq!(back.labeled.outputs()[0], 2.0);
        assert!(back.labeled.outputs()[1].is_nan());
        assert_eq!(back.labeled.ids(), result.labeled.ids());
    }

    #[cfg(feature = "checkpoint")]
    #[test]
    fn test_nan_outputs_survive_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.json");
        let mut result = sample();
        result.labeled.push(RowId(1), vec![2.0], f64::NAN).unwrap();
        result.save(&path).unwrap();
        let back = ActiveLearningResult::load(&path).unwrap();
        assert!(back.labeled.outputs()[1].is_nan());
    }

    #[cfg(feature = "checkpoint")]
    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = sample();
        result.save(&path).unwrap();
        assert_eq!(ActiveLearningResult::load(&path).unwrap(), result);
        assert!(matches!(
            ActiveLearningResult::load(&dir.path().join("missing.json")),
            Err(CheckpointError::Io(_))
        ));
    }
}
