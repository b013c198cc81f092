//! The unified tabular dataset.
//!
//! A [`LogTable`] is a column list plus rows of JSON objects. Fragments
//! downloaded from blob storage are each deserialized into a table and then
//! concatenated into one unified table at startup; after that the table is
//! immutable for the life of the process.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row: column name → value.
pub type Row = serde_json::Map<String, Value>;

/// A tabular dataset with a known column set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl LogTable {
    /// The empty table — what the loader degrades to on any failure.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from rows, deriving the column set as the union of row
    /// keys in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Concatenate fragments into one unified table.
    ///
    /// Columns are unioned in first-seen order; rows are appended in fragment
    /// order. Rows missing a column simply lack that key.
    pub fn concat(fragments: Vec<LogTable>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Row> = Vec::new();
        for fragment in fragments {
            for key in fragment.columns {
                if !columns.iter().any(|c| c == &key) {
                    columns.push(key);
                }
            }
            rows.extend(fragment.rows);
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `limit` rows, for prompt context.
    pub fn preview(&self, limit: usize) -> &[Row] {
        &self.rows[..self.rows.len().min(limit)]
    }
}
