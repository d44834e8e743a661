use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered feature columns captured at training time.
///
/// Every row handed to a classifier is assembled through the schema, so a
/// column missing from the source values is always filled with 0.0 and the
/// row width never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Row in schema order from named values
    pub fn row(&self, values: &HashMap<String, f64>) -> Vec<f64> {
        self.columns
            .iter()
            .map(|c| values.get(c).copied().unwrap_or(0.0))
            .collect()
    }

    /// Row with 1.0 in every listed column that the schema knows.
    /// Unknown names are ignored.
    pub fn one_hot<'a>(&self, active: impl IntoIterator<Item = &'a str>) -> Vec<f64> {
        let mut row = vec![0.0; self.columns.len()];
        for name in active {
            if let Some(i) = self.index_of(name) {
                row[i] = 1.0;
            }
        }
        row
    }
}
