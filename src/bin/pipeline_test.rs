use std::io::Write;

use basket::mining::mine;
use basket::session;
use basket::table::DataTable;
use basket::transform::incidence_matrix;
use basket::{loader, transform};

// Write a small retail dataset to a temp CSV file
fn write_sample_csv() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");

    let contents = "\
InvoiceNo,Description,Quantity
536412,JUMBO BAG RED RETROSPOT,10
536412,PARTY BUNTING,4
536412,POSTAGE,1
536413,JUMBO BAG RED RETROSPOT,2
536413,PARTY BUNTING,1
536413,POSTAGE,1
536414,JUMBO BAG RED RETROSPOT,0
536414,PARTY BUNTING,3
536414,POSTAGE,1
C536415,JUMBO BAG RED RETROSPOT,5
,PARTY BUNTING,2
";
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

fn test_load_and_transform() -> DataTable {
    println!("\n====== Testing load + transform ======");
    let file = write_sample_csv();
    let table = loader::load_table(file.path()).expect("CSV should load");
    assert_eq!(table.columns, vec!["InvoiceNo", "Description", "Quantity"]);
    assert_eq!(table.len(), 11);
    println!("✓ CSV loaded with {} rows", table.len());

    let cleaned = transform::clean_transactions(&table).expect("cleaning should succeed");
    // Cancelled invoice and the row without an invoice must be gone
    assert_eq!(cleaned.len(), 9);
    println!("✓ Cleaning dropped cancelled and invoice-less rows");

    let matrix = incidence_matrix(&table).expect("pivot should succeed");
    assert_eq!(matrix.transaction_count(), 3);
    assert_eq!(matrix.item_count(), 2);
    assert!(matrix.cells.iter().flatten().all(|&c| c == 0 || c == 1));
    println!(
        "✓ Incidence matrix is {} invoices x {} items, all binary",
        matrix.transaction_count(),
        matrix.item_count()
    );

    cleaned
}

fn test_mining() {
    println!("\n====== Testing mining ======");
    let file = write_sample_csv();
    let table = loader::load_table(file.path()).expect("CSV should load");
    let matrix = incidence_matrix(&table).expect("pivot should succeed");

    let (itemsets, rules) = mine(&matrix, 0.3, 0.5);

    let singles = itemsets.iter().filter(|s| s.items.len() == 1).count();
    assert_eq!(singles, 2);
    println!("✓ One frequent itemset per item at min_support=0.3");

    for rule in &rules {
        assert!(rule.confidence >= 0.5);
    }
    println!("✓ All {} rules clear the 0.5 confidence threshold", rules.len());

    let (none, no_rules) = mine(&matrix, 1.1, 0.5);
    assert!(none.is_empty());
    assert!(no_rules.is_empty());
    println!("✓ Impossible support threshold yields empty results, not a failure");
}

fn test_session_round_trip() {
    println!("\n====== Testing session round trip ======");
    let cleaned = test_helper_cleaned_table();

    let id = session::store_dataset(None, &cleaned, "sample.csv", Vec::new(), Vec::new())
        .expect("store should succeed");
    let record = session::get_record(&id).expect("record should exist");
    let reloaded = record.table().expect("table should deserialize");

    assert_eq!(reloaded, cleaned);
    println!("✓ Stored table round-trips with identical columns, rows and cells");

    session::destroy(&id);
    assert!(session::get_record(&id).is_none());
    println!("✓ Destroyed session is gone");
}

fn test_helper_cleaned_table() -> DataTable {
    let file = write_sample_csv();
    let table = loader::load_table(file.path()).expect("CSV should load");
    transform::clean_transactions(&table).expect("cleaning should succeed")
}

fn main() {
    println!("Running pipeline tests...");

    test_load_and_transform();
    test_mining();
    test_session_round_trip();

    println!("\nAll pipeline tests passed!");
}
