use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// A row-oriented table of string cells with named columns
///
/// This is the shape every uploaded spreadsheet is parsed into, and the shape
/// the session store serializes. Column order, row order and cell values are
/// preserved exactly through a JSON round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    /// Ordered column names
    pub columns: Vec<String>,

    /// Rows of cells; every row has one cell per column
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        DataTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Find a column's position by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding or truncating it to the column count
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The first `n` rows as a new table (the whole table if shorter)
    pub fn head(&self, n: usize) -> DataTable {
        DataTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Serialize for the session store
    pub fn to_json(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a table previously stored with [`DataTable::to_json`]
    pub fn from_json(json: &str) -> Result<DataTable, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }
}
