//! Error types for symbal
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::data::dataset::RowId;

/// Error type for data providers and labeled/candidate set bookkeeping
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    /// A row has a different number of features than its set
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A row identifier is not present in the set
    #[error("Unknown row: {0}")]
    UnknownRow(RowId),

    /// A row identifier was requested twice in one operation
    #[error("Duplicate row: {0}")]
    DuplicateRow(RowId),

    /// The provider cannot produce a label for a row
    #[error("Labeling failed for {id}: {reason}")]
    Labeling { id: RowId, reason: String },

    /// Invalid provider construction
    #[error("Invalid data configuration: {0}")]
    InvalidConfiguration(String),
}

/// Error type for surrogate model failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurrogateError {
    /// Fitting failed
    #[error("Fit failed: {0}")]
    FitFailed(String),

    /// Prediction requested before a successful fit
    #[error("Model has not been fitted")]
    NotFitted,

    /// Member index outside the ensemble
    #[error("Ensemble member {index} out of range (ensemble has {len} members)")]
    MemberOutOfRange { index: usize, len: usize },

    /// Input has the wrong number of features
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Error type for acquisition scoring
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AcquisitionError {
    /// The existing (labeled) set is empty but the criterion needs it
    #[error("Criterion '{0}' requires a non-empty existing set")]
    EmptyExisting(&'static str),

    /// Candidates and existing rows disagree on feature count
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Unknown distance metric name
    #[error("Unknown distance metric: {0}")]
    UnknownDistanceMetric(String),

    /// Surrogate prediction failed while scoring
    #[error("Surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),

    /// Gaussian-process fit or prediction failed
    #[error("Gaussian process error: {0}")]
    Gaussian(String),

    /// A criterion returned the wrong number of values
    #[error("Criterion '{name}' returned {actual} values for {expected} candidates")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Error type for batch selection
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// More rows requested than are available
    #[error("Cannot select {requested} rows from {available} candidates")]
    InsufficientCandidates { requested: usize, available: usize },

    /// Selector returned an identifier that was not offered
    #[error("Selector returned unknown row {0}")]
    UnknownRow(RowId),

    /// Selector returned the same identifier twice
    #[error("Selector returned row {0} more than once")]
    DuplicateRow(RowId),

    /// Selector returned the wrong number of rows
    #[error("Selector returned {actual} rows, expected {expected}")]
    WrongBatchSize { expected: usize, actual: usize },

    /// Scored matrix is internally inconsistent
    #[error("Malformed scored candidates: {0}")]
    Malformed(String),
}

/// Error type for result persistence
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// IO error while reading or writing a result file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Result format version is too new
    #[error("Result version {0} is newer than supported")]
    VersionTooNew(u32),
}

/// Top-level error type for active-learning runs
#[derive(Debug, Error)]
pub enum ActiveLearningError {
    /// Invalid configuration, raised at construction
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The batch is larger than the remaining candidate pool
    #[error("Insufficient candidates: batch of {requested} requested, {available} remaining")]
    InsufficientCandidates { requested: usize, available: usize },

    /// Data error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Surrogate error
    #[error("Surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),

    /// Acquisition error
    #[error("Acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Selection error
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Checkpoint error
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Result type alias for active-learning operations
pub type AlResult<T> = Result<T, ActiveLearningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_display() {
        let err = DataError::UnknownRow(RowId(7));
        assert_eq!(err.to_string(), "Unknown row: Row(7)");

        let err = DataError::DimensionMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 2, got 3");
    }

    #[test]
    fn test_insufficient_candidates_display() {
        let err = ActiveLearningError::InsufficientCandidates {
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient candidates: batch of 5 requested, 3 remaining"
        );
    }

    #[test]
    fn test_acquisition_error_from_surrogate_error() {
        let err: AcquisitionError = SurrogateError::NotFitted.into();
        assert!(matches!(err, AcquisitionError::Surrogate(_)));
        assert_eq!(err.to_string(), "Surrogate error: Model has not been fitted");
    }

    #[test]
    fn test_top_level_from_conversions() {
        let err: ActiveLearningError = SelectionError::DuplicateRow(RowId(1)).into();
        assert!(matches!(err, ActiveLearningError::Selection(_)));

        let err: ActiveLearningError = AcquisitionError::EmptyExisting("distance").into();
        assert!(err.to_string().contains("distance"));
    }
}
