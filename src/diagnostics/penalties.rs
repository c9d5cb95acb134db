//! Run-wide accumulation of selector penalty tables

use serde::{Deserialize, Serialize};

use crate::selection::penalty::PenaltyTable;

/// Concatenation of every iteration's penalty table
///
/// Columns are stored with their `"{iteration}-{name}"` prefix, iteration
/// numbers starting at 1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyAudit {
    table: PenaltyTable,
}

impl PenaltyAudit {
    /// Empty audit
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one iteration's table under the 1-based `iteration` prefix
    pub fn extend_prefixed(&mut self, iteration: usize, table: PenaltyTable) {
        self.table.extend(table.prefixed(iteration));
    }

    /// Underlying prefixed table
    pub fn table(&self) -> &PenaltyTable {
        &self.table
    }

    /// Column by prefixed name
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.table.column(name)
    }

    /// Number of columns across all iterations
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Distinct iteration prefixes in recording order
    pub fn column_groups(&self) -> Vec<usize> {
        let mut groups: Vec<usize> = Vec::new();
        for name in self.table.names() {
            let Some(prefix) = name.split_once('-').and_then(|(p, _)| p.parse().ok()) else {
                continue;
            };
            if !groups.contains(&prefix) {
                groups.push(prefix);
            }
        }
        groups
    }

    /// Columns recorded for one iteration, with the prefix stripped
    pub fn group(&self, iteration: usize) -> Vec<(&str, &[f64])> {
        let prefix = format!("{}-", iteration);
        self.table
            .columns()
            .iter()
            .filter_map(|(name, values)| {
                name.strip_prefix(&prefix)
                    .map(|bare| (bare, values.as_slice()))
            })
            .collect()
    }
}
