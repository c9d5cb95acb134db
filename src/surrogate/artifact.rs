//! Iteration-stamped artifact paths
//!
//! Surrogates persist their equations under a path whose file stem carries the
//! active-learning iteration as a trailing `_N` suffix:
//! `hall_of_fame.csv` → `hall_of_fame_0.csv` → `hall_of_fame_1.csv`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Path-like identifier of a surrogate's persisted artifact
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactPath(PathBuf);

impl ArtifactPath {
    /// Create from any path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Borrow as a path
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Stamp the path with an iteration index
    ///
    /// Iteration 0 appends `_0` to the stem; later iterations replace an
    /// existing trailing `_N` suffix (or append one when none is present).
    pub fn advance(&mut self, iteration: usize) {
        let stem = self
            .0
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = if iteration == 0 {
            stem.as_str()
        } else {
            strip_numeric_suffix(&stem)
        };
        let mut file_name = format!("{}_{}", base, iteration);
        if let Some(ext) = self.0.extension() {
            file_name.push('.');
            file_name.push_str(&ext.to_string_lossy());
        }
        self.0.set_file_name(file_name);
    }

    /// Trailing iteration suffix, if present
    pub fn iteration(&self) -> Option<usize> {
        let stem = self.0.file_stem()?.to_string_lossy();
        let (_, digits) = stem.rsplit_once('_')?;
        digits.parse().ok()
    }
}

fn strip_numeric_suffix(stem: &str) -> &str {
    match stem.rsplit_once('_') {
        Some((base, digits))
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => stem,
    }
}

impl Default for ArtifactPath {
    fn default() -> Self {
        Self::new("hall_of_fame.csv")
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for ArtifactPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
