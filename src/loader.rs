use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::DatasetError;
use crate::table::DataTable;

/// Load a transaction table from a CSV file
///
/// The first record is taken as the header row; every following record becomes
/// one row of string cells.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<DataTable, DatasetError>` - The loaded table or an error
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<DataTable, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(filepath)?;

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if columns.is_empty() {
        return Err(DatasetError::Parse("CSV file has no header row".to_string()));
    }

    let mut table = DataTable::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(table)
}

/// Load a transaction table from an Excel workbook
///
/// Reads the first worksheet; the first row is taken as the header row. Cell
/// values are rendered to text the same way they would display in a sheet.
///
/// # Arguments
/// * `filepath` - Path to the XLSX/XLS file to load
///
/// # Returns
/// * `Result<DataTable, DatasetError>` - The loaded table or an error
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<DataTable, DatasetError> {
    let mut workbook = open_workbook_auto(filepath)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DatasetError::Parse("workbook contains no sheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DatasetError::Parse("worksheet is empty".to_string()))?;

    let columns: Vec<String> = header.iter().map(cell_to_string).collect();
    let mut table = DataTable::new(columns);

    for row in rows {
        table.push_row(row.iter().map(cell_to_string).collect());
    }

    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Detect file type and load appropriate format
///
/// Examines the file extension and calls the CSV or Excel loader.
///
/// # Arguments
/// * `filepath` - Path to the file to load
///
/// # Returns
/// * `Result<DataTable, DatasetError>` - The loaded table or an error
pub fn load_table(filepath: impl AsRef<Path>) -> Result<DataTable, DatasetError> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(path),
        Some("xlsx") | Some("xls") => from_excel(path),
        Some(ext) => Err(DatasetError::UnsupportedExtension(ext.to_string())),
        None => Err(DatasetError::UnsupportedExtension(
            "(no extension)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        file.write_all(contents.as_bytes()).expect("write temp csv");
        file
    }

    #[test]
    fn csv_header_and_rows_survive() {
        let file = write_csv(
            "InvoiceNo,Description,Quantity\n\
             536365,WHITE HANGING HEART,6\n\
             536366,RED WOOLLY HOTTIE,3\n",
        );
        let table = load_table(file.path()).unwrap();
        assert_eq!(table.columns, vec!["InvoiceNo", "Description", "Quantity"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][1], "RED WOOLLY HOTTIE");
    }

    #[test]
    fn quoted_fields_with_commas_parse() {
        let file = write_csv(
            "InvoiceNo,Description,Quantity\n\
             536365,\"BOX OF 6, VINTAGE\",2\n",
        );
        let table = load_table(file.path()).unwrap();
        assert_eq!(table.rows[0][1], "BOX OF 6, VINTAGE");
    }

    #[test]
    fn short_rows_are_padded_to_the_header_width() {
        let file = write_csv(
            "InvoiceNo,Description,Quantity\n\
             536365,WHITE HANGING HEART\n",
        );
        let table = load_table(file.path()).unwrap();
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], "");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_table("dataset.pdf").unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedExtension(ext) if ext == "pdf"));
    }
}
