//! Named diagnostic columns emitted by batch selectors

use serde::{Deserialize, Serialize};

/// Ordered table of named `f64` columns
///
/// Columns may differ in length; each iteration's table covers the candidate
/// set as it was at that iteration. Non-finite values are stored as `null` in
/// JSON and read back as NaN.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyTable {
    #[serde(with = "crate::diagnostics::nan_as_null::columns")]
    columns: Vec<(String, Vec<f64>)>,
}

impl PenaltyTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style)
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.push_column(name, values);
        self
    }

    /// Append a column, replacing any column of the same name
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// All columns in order
    pub fn columns(&self) -> &[(String, Vec<f64>)] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Same table with every column renamed to `"{prefix}-{name}"`
    pub fn prefixed(self, prefix: usize) -> Self {
        Self {
            columns: self
                .columns
                .into_iter()
                .map(|(name, values)| (format!("{}-{}", prefix, name), values))
                .collect(),
        }
    }

    /// Append another table's columns
    pub fn extend(&mut self, other: PenaltyTable) {
        for (name, values) in other.columns {
            self.push_column(name, values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_lookup() {
        let table = PenaltyTable::new()
            .with_column("objective", vec![1.0, 2.0])
            .with_column("penalty", vec![0.0, 0.5])
            .prefixed(3);
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["3-objective", "3-penalty"]);
        assert_eq!(table.column("3-penalty"), Some(&[0.0, 0.5][..]));
        assert!(table.column("penalty").is_none());
    }

    #[test]
    fn test_push_replaces_same_name() {
        let mut table = PenaltyTable::new().with_column("a", vec![1.0]);
        table.push_column("a", vec![2.0, 3.0]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.column("a"), Some(&[2.0, 3.0][..]));
    }
}
