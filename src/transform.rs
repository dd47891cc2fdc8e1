use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::table::DataTable;

/// Column the invoice identifier lives in
pub const INVOICE_COLUMN: &str = "InvoiceNo";

/// Column the item description lives in
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Column the line-item quantity lives in
pub const QUANTITY_COLUMN: &str = "Quantity";

/// Non-item charge line dropped from the pivoted matrix
pub const POSTAGE_ITEM: &str = "POSTAGE";

// Invoice identifiers containing this marker denote cancellations
const CANCELLATION_MARKER: char = 'C';

/// Binary invoice-by-item presence matrix, the input to mining
///
/// One row per distinct non-cancelled invoice, one column per distinct item
/// description (POSTAGE excluded), every cell 0 or 1. Invoices and items are
/// kept in sorted order so the matrix is deterministic for a given dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceMatrix {
    /// Distinct invoice identifiers, sorted
    pub invoices: Vec<String>,

    /// Distinct item descriptions, sorted
    pub items: Vec<String>,

    /// cells[row][col] = 1 iff the invoice contains the item
    pub cells: Vec<Vec<u8>>,
}

impl IncidenceMatrix {
    /// Number of transactions (invoices)
    pub fn transaction_count(&self) -> usize {
        self.invoices.len()
    }

    /// Number of item columns
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Clean a raw transaction table
///
/// Trims item descriptions, drops rows with an empty invoice identifier and
/// drops invoices marked as cancellations. The three required columns must be
/// present or a schema-validation error is returned.
///
/// # Arguments
/// * `table` - The parsed upload
///
/// # Returns
/// * `Result<DataTable, DatasetError>` - The cleaned table or a schema error
pub fn clean_transactions(table: &DataTable) -> Result<DataTable, DatasetError> {
    let invoice_idx = require_column(table, INVOICE_COLUMN)?;
    let desc_idx = require_column(table, DESCRIPTION_COLUMN)?;
    require_column(table, QUANTITY_COLUMN)?;

    let mut cleaned = DataTable::new(table.columns.clone());
    for row in &table.rows {
        let invoice = row[invoice_idx].trim();
        if invoice.is_empty() {
            continue;
        }
        if invoice.contains(CANCELLATION_MARKER) {
            continue;
        }

        let mut out = row.clone();
        out[invoice_idx] = invoice.to_string();
        out[desc_idx] = row[desc_idx].trim().to_string();
        cleaned.rows.push(out);
    }

    Ok(cleaned)
}

/// Pivot a transaction table into the binary incidence matrix
///
/// Runs the full pipeline: clean, aggregate quantities by (invoice, item),
/// pivot with absent combinations as 0, binarize, and drop the POSTAGE column.
/// A dataset without a POSTAGE column is rejected as a schema error rather
/// than failing mid-pivot.
///
/// # Arguments
/// * `table` - The parsed upload
///
/// # Returns
/// * `Result<IncidenceMatrix, DatasetError>` - The matrix or a schema error
pub fn incidence_matrix(table: &DataTable) -> Result<IncidenceMatrix, DatasetError> {
    let cleaned = clean_transactions(table)?;

    let invoice_idx = require_column(&cleaned, INVOICE_COLUMN)?;
    let desc_idx = require_column(&cleaned, DESCRIPTION_COLUMN)?;
    let qty_idx = require_column(&cleaned, QUANTITY_COLUMN)?;

    // Aggregate quantities per (invoice, item); BTreeMap keeps the pivot sorted
    let mut sums: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut items: BTreeSet<String> = BTreeSet::new();

    for row in &cleaned.rows {
        let invoice = row[invoice_idx].clone();
        let item = row[desc_idx].clone();
        if item.is_empty() {
            continue;
        }
        let qty: f64 = row[qty_idx].trim().parse().unwrap_or(0.0);

        items.insert(item.clone());
        *sums.entry((invoice, item)).or_insert(0.0) += qty;
    }

    if sums.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }

    if !items.remove(POSTAGE_ITEM) {
        return Err(DatasetError::MissingItem(POSTAGE_ITEM.to_string()));
    }

    let invoices: BTreeSet<String> = sums.keys().map(|(inv, _)| inv.clone()).collect();
    let invoices: Vec<String> = invoices.into_iter().collect();
    let items: Vec<String> = items.into_iter().collect();

    let mut cells = Vec::with_capacity(invoices.len());
    for invoice in &invoices {
        let mut row = Vec::with_capacity(items.len());
        for item in &items {
            let qty = sums
                .get(&(invoice.clone(), item.clone()))
                .copied()
                .unwrap_or(0.0);
            row.push(if qty >= 1.0 { 1 } else { 0 });
        }
        cells.push(row);
    }

    Ok(IncidenceMatrix {
        invoices,
        items,
        cells,
    })
}

fn require_column(table: &DataTable, name: &str) -> Result<usize, DatasetError> {
    table
        .column_index(name)
        .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
}
